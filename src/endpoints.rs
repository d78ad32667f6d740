//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}/edit', use [format_endpoint].

/// The root route which redirects to the transactions page.
pub const ROOT: &str = "/";
/// The page listing transactions with filters and pagination.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page asking to confirm the deletion of a transaction.
pub const DELETE_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/delete";
/// The page for managing statuses, transaction types, categories and subcategories.
pub const DICTIONARIES_VIEW: &str = "/dictionaries";
/// The index of the read-only inspection pages.
pub const INSPECT_VIEW: &str = "/inspect";
/// Read-only list of statuses.
pub const INSPECT_STATUSES_VIEW: &str = "/inspect/statuses";
/// Read-only list of transaction types.
pub const INSPECT_TRANSACTION_TYPES_VIEW: &str = "/inspect/transaction-types";
/// Read-only list of categories.
pub const INSPECT_CATEGORIES_VIEW: &str = "/inspect/categories";
/// Read-only list of subcategories.
pub const INSPECT_SUBCATEGORIES_VIEW: &str = "/inspect/subcategories";
/// Read-only list of transactions.
pub const INSPECT_TRANSACTIONS_VIEW: &str = "/inspect/transactions";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update a transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}/delete";
/// JSON list of the categories of a transaction type.
pub const LOAD_CATEGORIES: &str = "/api/load-categories";
/// JSON list of the subcategories of a category.
pub const LOAD_SUBCATEGORIES: &str = "/api/load-subcategories";

/// The route to create a status.
pub const STATUSES_API: &str = "/api/statuses";
/// The route to rename a status.
pub const EDIT_STATUS: &str = "/api/statuses/{status_id}/edit";
/// The route to delete a status.
pub const DELETE_STATUS: &str = "/api/statuses/{status_id}/delete";
/// The route to create a transaction type.
pub const TRANSACTION_TYPES_API: &str = "/api/transaction-types";
/// The route to rename a transaction type.
pub const EDIT_TRANSACTION_TYPE: &str = "/api/transaction-types/{transaction_type_id}/edit";
/// The route to delete a transaction type.
pub const DELETE_TRANSACTION_TYPE: &str = "/api/transaction-types/{transaction_type_id}/delete";
/// The route to create a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update a category.
pub const EDIT_CATEGORY: &str = "/api/categories/{category_id}/edit";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}/delete";
/// The route to create a subcategory.
pub const SUBCATEGORIES_API: &str = "/api/subcategories";
/// The route to update a subcategory.
pub const EDIT_SUBCATEGORY: &str = "/api/subcategories/{subcategory_id}/edit";
/// The route to delete a subcategory.
pub const DELETE_SUBCATEGORY: &str = "/api/subcategories/{subcategory_id}/delete";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/statuses/{status_id}', '{status_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.char_indices() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
