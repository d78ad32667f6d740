//! The page and endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
// axum_extra's Form accepts fields that are missing from the submission.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    timezone::current_local_date,
    transaction::{
        TransactionRepository,
        form::{
            FieldErrors, FormChoices, TransactionForm, transaction_form_page,
            transaction_form_view, validate,
        },
    },
};

/// The state needed by the transaction form pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionFormState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(State(state): State<TransactionFormState>) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let choices = match FormChoices::load(None, None, &connection) {
        Ok(choices) => choices,
        Err(error) => {
            tracing::error!("could not load choices for new transaction page: {error}");
            return error.into_response();
        }
    };

    let form = transaction_form_view(
        endpoints::TRANSACTIONS_API,
        "Create Transaction",
        &TransactionForm::new_with_date(today),
        &choices,
        &FieldErrors::default(),
    );

    Html(
        transaction_form_page("New Transaction", endpoints::NEW_TRANSACTION_VIEW, form)
            .into_string(),
    )
    .into_response()
}

/// A route handler for creating a new transaction.
///
/// Redirects to the transactions page on success, otherwise responds with
/// the form and its validation errors.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionFormState>,
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

    let choices = match FormChoices::load(Some(&form), None, &connection) {
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
                    endpoints::TRANSACTIONS_API,
                    "Create Transaction",
                    &form,
                    &choices,
                    &errors,
                )
                .into_string(),
            )
            .into_response();
        }
    };

    match TransactionRepository::new(&connection).create(builder) {
        Ok(transaction) => {
            tracing::info!("created transaction {}", transaction.id);

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            error.log_failure("create transaction");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_hx_redirect, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
        transaction::{
            TransactionRepository,
            core::test_fixture::{Taxonomy, create_taxonomy, get_test_connection},
            create::{
                TransactionFormState, create_transaction_endpoint, get_new_transaction_page,
            },
            form::TransactionForm,
        },
    };

    fn get_state() -> (TransactionFormState, Taxonomy) {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        (
            TransactionFormState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            taxonomy,
        )
    }

    fn expense_form(taxonomy: &Taxonomy) -> TransactionForm {
        TransactionForm {
            date: "2024-01-20".to_owned(),
            status: taxonomy.business.id.to_string(),
            transaction_type: taxonomy.expense.id.to_string(),
            category: taxonomy.marketing.id.to_string(),
            subcategory: taxonomy.avito.id.to_string(),
            amount: "2500".to_owned(),
            comment: "Ad campaign".to_owned(),
        }
    }

    #[tokio::test]
    async fn new_transaction_page_renders_form() {
        let (state, _) = get_state();

        let response = get_new_transaction_page(State(state)).await;

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "date", "date");
        assert_form_input(&form, "amount", "number");
        assert_form_submit_button_with_text(&form, "Create Transaction");
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, taxonomy) = get_state();

        let response =
            create_transaction_endpoint(State(state.clone()), Form(expense_form(&taxonomy)))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let listing = TransactionRepository::new(&connection)
            .list_filtered(&Default::default(), 20, 0)
            .unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].date, date!(2024 - 01 - 20));
        assert_eq!(listing[0].comment, "Ad campaign");
    }

    #[tokio::test]
    async fn zero_amount_renders_form_with_error() {
        let (state, taxonomy) = get_state();
        let form = TransactionForm {
            amount: "0".to_owned(),
            ..expense_form(&taxonomy)
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Amount must be at least 0.01"), "got {text:?}");
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(TransactionRepository::new(&connection).count(), Ok(0));
    }

    #[tokio::test]
    async fn mismatched_category_renders_form_with_error() {
        let (state, taxonomy) = get_state();
        let form = TransactionForm {
            transaction_type: taxonomy.income.id.to_string(),
            ..expense_form(&taxonomy)
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Select a valid category"), "got {text:?}");
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(TransactionRepository::new(&connection).count(), Ok(0));
    }
}
