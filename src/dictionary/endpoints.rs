//! POST endpoints for adding, editing and deleting dictionary entries.
//!
//! Every endpoint redirects back to the dictionaries page on success and
//! responds with an alert describing the problem otherwise, e.g. when the
//! entry is still used by transactions.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    CategoryId, EntryKind, EntryName, Error, StatusId, SubcategoryId, TransactionTypeId,
    dictionary::{
        CategoryRepository, DictionaryState, StatusRepository, SubcategoryRepository,
        TransactionTypeRepository,
    },
    endpoints,
};

/// The form for a status or transaction type.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NameForm {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
    pub transaction_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubcategoryForm {
    pub name: String,
    pub category: String,
}

/// Parse the ID of a parent entry, treating anything that is not an ID as a
/// reference to a missing entry.
fn parse_parent<Id: FromStr>(raw: &str, kind: EntryKind) -> Result<Id, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidReference(kind))
}

/// Run `operation` with the database connection and turn its result into a
/// response.
fn apply(
    state: &DictionaryState,
    action: &str,
    operation: impl FnOnce(&Connection) -> Result<(), Error>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match operation(&connection) {
        Ok(()) => {
            tracing::info!("{action} succeeded");

            (
                HxRedirect(endpoints::DICTIONARIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            error.log_failure(action);
            error.into_alert_response()
        }
    }
}

pub async fn create_status_endpoint(
    State(state): State<DictionaryState>,
    Form(form): Form<NameForm>,
) -> Response {
    apply(&state, "create status", |connection| {
        let name = EntryName::new(&form.name)?;
        StatusRepository::new(connection).create(name).map(|_| ())
    })
}

pub async fn update_status_endpoint(
    State(state): State<DictionaryState>,
    Path(status_id): Path<StatusId>,
    Form(form): Form<NameForm>,
) -> Response {
    apply(&state, &format!("update status {status_id}"), |connection| {
        let name = EntryName::new(&form.name)?;
        StatusRepository::new(connection).update(status_id, name)
    })
}

pub async fn delete_status_endpoint(
    State(state): State<DictionaryState>,
    Path(status_id): Path<StatusId>,
) -> Response {
    apply(&state, &format!("delete status {status_id}"), |connection| {
        StatusRepository::new(connection).delete(status_id)
    })
}

pub async fn create_transaction_type_endpoint(
    State(state): State<DictionaryState>,
    Form(form): Form<NameForm>,
) -> Response {
    apply(&state, "create transaction type", |connection| {
        let name = EntryName::new(&form.name)?;
        TransactionTypeRepository::new(connection)
            .create(name)
            .map(|_| ())
    })
}

pub async fn update_transaction_type_endpoint(
    State(state): State<DictionaryState>,
    Path(transaction_type_id): Path<TransactionTypeId>,
    Form(form): Form<NameForm>,
) -> Response {
    apply(
        &state,
        &format!("update transaction type {transaction_type_id}"),
        |connection| {
            let name = EntryName::new(&form.name)?;
            TransactionTypeRepository::new(connection).update(transaction_type_id, name)
        },
    )
}

/// Deleting a transaction type also deletes its categories and their
/// subcategories, unless a transaction uses any of them.
pub async fn delete_transaction_type_endpoint(
    State(state): State<DictionaryState>,
    Path(transaction_type_id): Path<TransactionTypeId>,
) -> Response {
    apply(
        &state,
        &format!("delete transaction type {transaction_type_id}"),
        |connection| TransactionTypeRepository::new(connection).delete(transaction_type_id),
    )
}

pub async fn create_category_endpoint(
    State(state): State<DictionaryState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    apply(&state, "create category", |connection| {
        let name = EntryName::new(&form.name)?;
        let transaction_type_id =
            parse_parent::<TransactionTypeId>(&form.transaction_type, EntryKind::TransactionType)?;

        CategoryRepository::new(connection)
            .create(name, transaction_type_id)
            .map(|_| ())
    })
}

pub async fn update_category_endpoint(
    State(state): State<DictionaryState>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    apply(&state, &format!("update category {category_id}"), |connection| {
        let name = EntryName::new(&form.name)?;
        let transaction_type_id =
            parse_parent::<TransactionTypeId>(&form.transaction_type, EntryKind::TransactionType)?;

        CategoryRepository::new(connection).update(category_id, name, transaction_type_id)
    })
}

/// Deleting a category also deletes its subcategories, unless a transaction
/// uses any of them.
pub async fn delete_category_endpoint(
    State(state): State<DictionaryState>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    apply(&state, &format!("delete category {category_id}"), |connection| {
        CategoryRepository::new(connection).delete(category_id)
    })
}

pub async fn create_subcategory_endpoint(
    State(state): State<DictionaryState>,
    Form(form): Form<SubcategoryForm>,
) -> Response {
    apply(&state, "create subcategory", |connection| {
        let name = EntryName::new(&form.name)?;
        let category_id = parse_parent::<CategoryId>(&form.category, EntryKind::Category)?;

        SubcategoryRepository::new(connection)
            .create(name, category_id)
            .map(|_| ())
    })
}

pub async fn update_subcategory_endpoint(
    State(state): State<DictionaryState>,
    Path(subcategory_id): Path<SubcategoryId>,
    Form(form): Form<SubcategoryForm>,
) -> Response {
    apply(
        &state,
        &format!("update subcategory {subcategory_id}"),
        |connection| {
            let name = EntryName::new(&form.name)?;
            let category_id = parse_parent::<CategoryId>(&form.category, EntryKind::Category)?;

            SubcategoryRepository::new(connection).update(subcategory_id, name, category_id)
        },
    )
}

pub async fn delete_subcategory_endpoint(
    State(state): State<DictionaryState>,
    Path(subcategory_id): Path<SubcategoryId>,
) -> Response {
    apply(
        &state,
        &format!("delete subcategory {subcategory_id}"),
        |connection| SubcategoryRepository::new(connection).delete(subcategory_id),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        StatusId,
        dictionary::{
            CategoryRepository, DictionaryState, StatusRepository, SubcategoryRepository,
            TransactionTypeRepository,
            endpoints::{
                CategoryForm, NameForm, SubcategoryForm, create_category_endpoint,
                create_status_endpoint, create_subcategory_endpoint, delete_category_endpoint,
                delete_status_endpoint, delete_transaction_type_endpoint,
                update_category_endpoint, update_status_endpoint,
            },
        },
        endpoints,
        test_utils::{assert_hx_redirect, parse_html_fragment},
        transaction::{
            TransactionRepository,
            test_fixture::{Taxonomy, create_taxonomy, get_test_connection},
        },
    };

    fn get_state() -> (DictionaryState, Taxonomy) {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        (
            DictionaryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            taxonomy,
        )
    }

    async fn alert_text(response: axum::response::Response) -> String {
        parse_html_fragment(response)
            .await
            .root_element()
            .text()
            .collect()
    }

    #[tokio::test]
    async fn can_create_status() {
        let (state, _) = get_state();

        let response = create_status_endpoint(
            State(state.clone()),
            Form(NameForm {
                name: " Tax ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DICTIONARIES_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let names = StatusRepository::new(&connection)
            .get_all()
            .unwrap()
            .into_iter()
            .map(|status| status.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Business", "Personal", "Tax"]);
    }

    #[tokio::test]
    async fn blank_name_renders_alert() {
        let (state, _) = get_state();

        let response = create_status_endpoint(
            State(state),
            Form(NameForm {
                name: "   ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(alert_text(response).await.contains("Name cannot be empty"));
    }

    #[tokio::test]
    async fn duplicate_name_renders_alert() {
        let (state, _) = get_state();

        let response = create_status_endpoint(
            State(state),
            Form(NameForm {
                name: "Personal".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(alert_text(response).await.contains("Duplicate status"));
    }

    #[tokio::test]
    async fn renaming_missing_status_renders_not_found() {
        let (state, _) = get_state();

        let response = update_status_endpoint(
            State(state),
            Path(StatusId::new(404)),
            Form(NameForm {
                name: "Other".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_used_status_renders_conflict_and_keeps_data() {
        let (state, taxonomy) = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            TransactionRepository::new(&connection)
                .create(taxonomy.income_on(date!(2024 - 05 - 01), "10"))
                .unwrap();
        }

        let response = delete_status_endpoint(State(state.clone()), Path(taxonomy.personal.id)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(
            alert_text(response)
                .await
                .contains("used by one or more transactions")
        );
        let connection = state.db_connection.lock().unwrap();
        assert!(StatusRepository::new(&connection).get(taxonomy.personal.id).is_ok());
    }

    #[tokio::test]
    async fn deleting_used_type_renders_conflict_and_keeps_taxonomy() {
        let (state, taxonomy) = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            TransactionRepository::new(&connection)
                .create(taxonomy.expense_on(date!(2024 - 05 - 01), "10"))
                .unwrap();
        }

        let response =
            delete_transaction_type_endpoint(State(state.clone()), Path(taxonomy.expense.id)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(
            alert_text(response)
                .await
                .contains("used by one or more transactions")
        );
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(TransactionTypeRepository::new(&connection).count(), Ok(2));
        assert_eq!(CategoryRepository::new(&connection).count(), Ok(2));
        assert_eq!(SubcategoryRepository::new(&connection).count(), Ok(3));
    }

    #[tokio::test]
    async fn deleting_unused_type_removes_its_categories() {
        let (state, taxonomy) = get_state();

        let response =
            delete_transaction_type_endpoint(State(state.clone()), Path(taxonomy.expense.id)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(TransactionTypeRepository::new(&connection).count(), Ok(1));
        assert_eq!(CategoryRepository::new(&connection).count(), Ok(1));
        assert_eq!(SubcategoryRepository::new(&connection).count(), Ok(2));
    }

    #[tokio::test]
    async fn can_create_category_under_type() {
        let (state, taxonomy) = get_state();

        let response = create_category_endpoint(
            State(state.clone()),
            Form(CategoryForm {
                name: "Infrastructure".to_owned(),
                transaction_type: taxonomy.expense.id.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        let names = CategoryRepository::new(&connection)
            .for_transaction_type(taxonomy.expense.id)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Infrastructure", "Marketing"]);
    }

    #[tokio::test]
    async fn category_with_malformed_type_renders_alert() {
        let (state, _) = get_state();

        let response = create_category_endpoint(
            State(state),
            Form(CategoryForm {
                name: "Infrastructure".to_owned(),
                transaction_type: "expense".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(alert_text(response).await.contains("Invalid transaction type"));
    }

    #[tokio::test]
    async fn moving_used_category_renders_conflict() {
        let (state, taxonomy) = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            TransactionRepository::new(&connection)
                .create(taxonomy.expense_on(date!(2024 - 05 - 01), "10"))
                .unwrap();
        }

        let response = update_category_endpoint(
            State(state),
            Path(taxonomy.marketing.id),
            Form(CategoryForm {
                name: "Marketing".to_owned(),
                transaction_type: taxonomy.income.id.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn deleting_missing_category_renders_not_found() {
        let (state, _) = get_state();

        let response = delete_category_endpoint(State(state), Path(crate::CategoryId::new(77))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_subcategory_within_category_renders_alert() {
        let (state, taxonomy) = get_state();

        let response = create_subcategory_endpoint(
            State(state),
            Form(SubcategoryForm {
                name: "Main job".to_owned(),
                category: taxonomy.salary.id.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
