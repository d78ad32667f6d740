//! The confirmation page and endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, TransactionId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
    transaction::TransactionRepository,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders a summary of the transaction and asks the user to confirm its
/// deletion.
pub async fn get_delete_transaction_page(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let transaction = match TransactionRepository::new(&connection).get_listing(transaction_id) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
            return error.into_response();
        }
    };

    let summary = [
        ("Date", transaction.date.to_string()),
        ("Status", transaction.status.to_string()),
        ("Type", transaction.transaction_type.to_string()),
        ("Category", transaction.category.to_string()),
        ("Subcategory", transaction.subcategory.to_string()),
        ("Amount", transaction.amount.to_grouped_string()),
        ("Comment", transaction.comment.clone()),
    ];

    let content = html! {
        (NavBar::new(endpoints::DELETE_TRANSACTION_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full bg-white rounded-lg shadow dark:border sm:max-w-md
                dark:bg-gray-800 dark:border-gray-700 p-6 space-y-4 sm:p-8"
            {
                h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl"
                {
                    "Delete Transaction"
                }

                p { "Are you sure you want to delete this transaction? This cannot be undone." }

                dl class="grid grid-cols-3 gap-2 text-sm"
                {
                    @for (term, description) in summary {
                        dt class="font-semibold" { (term) }
                        dd class="col-span-2" { (description) }
                    }
                }

                form
                    hx-post=(format_endpoint(endpoints::DELETE_TRANSACTION, transaction_id.as_i64()))
                    hx-target-error="#alert-container"
                    class="flex gap-4 items-center"
                {
                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }

                    a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Cancel" }
                }
            }
        }
    };

    Html(base("Delete Transaction", &[], &content).into_string()).into_response()
}

/// A route handler for deleting a transaction, redirects to the transactions
/// page on success.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match TransactionRepository::new(&connection).delete(transaction_id) {
        Ok(()) => {
            tracing::info!("deleted transaction {transaction_id}");

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            error.log_failure(&format!("delete transaction {transaction_id}"));
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        Error, TransactionId, endpoints,
        test_utils::{
            assert_hx_endpoint, assert_hx_redirect, assert_status_ok, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::{
            TransactionRepository,
            core::test_fixture::{create_taxonomy, get_test_connection},
            delete::{
                DeleteTransactionState, delete_transaction_endpoint, get_delete_transaction_page,
            },
        },
    };

    fn get_state_with_transaction() -> (DeleteTransactionState, TransactionId) {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);
        let transaction = TransactionRepository::new(&connection)
            .create(
                taxonomy
                    .expense_on(date!(2024 - 03 - 05), "1234.5")
                    .comment("Proxy renewal"),
            )
            .unwrap();

        (
            DeleteTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            transaction.id,
        )
    }

    #[tokio::test]
    async fn confirmation_page_summarises_transaction() {
        let (state, transaction_id) = get_state_with_transaction();

        let response = get_delete_transaction_page(State(state), Path(transaction_id)).await;

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, "/api/transactions/1/delete", "hx-post");
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("1,234.50"), "got {text:?}");
        assert!(text.contains("Proxy renewal"), "got {text:?}");
    }

    #[tokio::test]
    async fn confirmation_page_for_missing_transaction_is_not_found() {
        let (state, _) = get_state_with_transaction();

        let response = get_delete_transaction_page(State(state), Path(TransactionId::new(7))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn can_delete_transaction() {
        let (state, transaction_id) = get_state_with_transaction();

        let response = delete_transaction_endpoint(State(state.clone()), Path(transaction_id)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            TransactionRepository::new(&connection).get(transaction_id),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_missing_transaction_renders_alert() {
        let (state, _) = get_state_with_transaction();

        let response =
            delete_transaction_endpoint(State(state), Path(TransactionId::new(7))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
