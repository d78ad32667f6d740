//! The page and endpoint for changing an existing transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    EntryKind, Error, TransactionId,
    endpoints::{self, format_endpoint},
    timezone::current_local_date,
    transaction::{
        TransactionRepository,
        create::TransactionFormState,
        form::{
            FieldErrors, FormChoices, TransactionForm, transaction_form_page,
            transaction_form_view, validate,
        },
    },
};

/// Renders the page for editing a transaction.
///
/// The category and subcategory dropdowns start out restricted to the
/// transaction's current type and category.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionFormState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let transaction = match TransactionRepository::new(&connection).get(transaction_id) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
            return error.into_response();
        }
    };

    let choices = match FormChoices::load(None, Some(&transaction), &connection) {
        Ok(choices) => choices,
        Err(error) => {
            tracing::error!("could not load choices for edit transaction page: {error}");
            return error.into_response();
        }
    };

    let form = transaction_form_view(
        &format_endpoint(endpoints::TRANSACTION, transaction_id.as_i64()),
        "Save Transaction",
        &TransactionForm::from_transaction(&transaction),
        &choices,
        &FieldErrors::default(),
    );

    Html(
        transaction_form_page("Edit Transaction", endpoints::EDIT_TRANSACTION_VIEW, form)
            .into_string(),
    )
    .into_response()
}

/// A route handler for updating a transaction.
///
/// Redirects to the transactions page on success, otherwise responds with
/// the form and its validation errors.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionFormState>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let repository = TransactionRepository::new(&connection);
    let transaction = match repository.get(transaction_id) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => {
            return Error::UpdateMissing(EntryKind::Transaction).into_alert_response();
        }
        Err(error) => {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    let choices = match FormChoices::load(Some(&form), Some(&transaction), &connection) {
        Ok(choices) => choices,
        Err(error) => {
            tracing::error!("could not load transaction form choices: {error}");
            return error.into_alert_response();
        }
    };

    let builder = match validate(&form, &choices, today) {
        Ok(builder) => builder,
        Err(errors) => {
            return Html(
                transaction_form_view(
                    &format_endpoint(endpoints::TRANSACTION, transaction_id.as_i64()),
                    "Save Transaction",
                    &form,
                    &choices,
                    &errors,
                )
                .into_string(),
            )
            .into_response();
        }
    };

    match repository.update(transaction_id, builder) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            error.log_failure(&format!("update transaction {transaction_id}"));
            error.into_alert_response()
        }
    }
}
