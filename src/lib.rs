//! Ledger is a web app for recording income and expenses for a household or
//! small business.
//!
//! Transactions are classified by a three level taxonomy (transaction type,
//! category and subcategory) and tagged with a status. This library provides
//! an HTTP server that directly serves HTML pages, plus the seeding logic used
//! by the command line tools.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod amount;
mod app_state;
mod database_id;
mod db;
mod dictionary;
mod endpoints;
mod html;
mod inspect;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod routing;
mod seed;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use amount::Amount;
pub use app_state::AppState;
pub use database_id::{CategoryId, StatusId, SubcategoryId, TransactionId, TransactionTypeId};
pub use db::initialize as initialize_db;
pub use dictionary::{EntryKind, EntryName};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use seed::{
    CreatedEntry, InitialDataReport, TestTransactionsReport, load_initial_data,
    load_test_transactions,
};
pub use timezone::current_local_date;
pub use transaction::TransactionListing;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty or whitespace-only string was used as the name of a
    /// dictionary entry.
    #[error("Name cannot be empty")]
    EmptyName,

    /// The name of a dictionary entry was longer than
    /// [EntryName::MAX_LENGTH] characters.
    #[error("Name must be at most {} characters", EntryName::MAX_LENGTH)]
    NameTooLong,

    /// A dictionary entry with the same name already exists.
    ///
    /// Statuses and transaction types must have globally unique names,
    /// categories must be unique within their transaction type and
    /// subcategories must be unique within their category.
    #[error("the {0} \"{1}\" already exists")]
    DuplicateName(EntryKind, String),

    /// An ID used to create or update a record did not refer to an existing
    /// entry of the given kind.
    #[error("the selected {0} does not exist")]
    InvalidReference(EntryKind),

    /// The category of a transaction does not belong to the transaction's
    /// type.
    #[error("the category does not belong to the selected transaction type")]
    CategoryTypeMismatch,

    /// The subcategory of a transaction does not belong to the transaction's
    /// category.
    #[error("the subcategory does not belong to the selected category")]
    SubcategoryCategoryMismatch,

    /// The amount was smaller than the smallest allowed amount of 0.01.
    #[error("Amount must be at least 0.01")]
    AmountTooSmall,

    /// The amount had more than two decimal places.
    #[error("Amount must have at most 2 decimal places")]
    AmountTooPrecise,

    /// The amount had more than ten digits before the decimal point.
    #[error("Amount must have at most 12 digits")]
    AmountTooLarge,

    /// The string could not be parsed as a decimal number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The string could not be parsed as an ISO 8601 date.
    #[error("\"{0}\" is not a valid date, use the format YYYY-MM-DD")]
    InvalidDate(String),

    /// Deleting the entry would leave transactions pointing at nothing.
    #[error("the {0} is used by one or more transactions")]
    DeleteInUse(EntryKind),

    /// Moving the entry to a new parent would break the taxonomy of the
    /// transactions that use it.
    #[error("the {0} is used by one or more transactions and cannot be moved")]
    MoveInUse(EntryKind),

    /// Tried to update an entry that does not exist.
    #[error("tried to update a {0} that is not in the database")]
    UpdateMissing(EntryKind),

    /// Tried to delete an entry that does not exist.
    #[error("tried to delete a {0} that is not in the database")]
    DeleteMissing(EntryKind),

    /// Reference data that is needed to generate sample transactions is
    /// missing.
    #[error("no {0} found, run load_initial_data first")]
    MissingReferenceData(EntryKind),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

const TIMEZONE_FIX: &str = "Check your server settings and ensure the timezone has been set to a \
    valid, canonical timezone string";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: &format!("Could not get local timezone \"{timezone}\"."),
                fix: TIMEZONE_FIX,
            }
            .into_response(),
            Error::DatabaseLockError => {
                InternalServerError::database_unavailable().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Whether the error is a fault in the server rather than a problem with
    /// the request or the data the user submitted.
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Error::SqlError(_) | Error::InvalidTimezoneError(_) | Error::DatabaseLockError
        )
    }

    /// Log that `action` failed: server errors at error level, anything the
    /// user can fix at warn level.
    fn log_failure(&self, action: &str) {
        if self.is_server_error() {
            tracing::error!("could not {action}: {self}");
        } else {
            tracing::warn!("could not {action}: {self}");
        }
    }

    /// Render the error as an alert fragment for htmx requests.
    fn into_alert_response(self) -> Response {
        let (status_code, message, details) = match &self {
            Error::EmptyName | Error::NameTooLong => (
                StatusCode::BAD_REQUEST,
                "Invalid name".to_owned(),
                self.to_string(),
            ),
            Error::DuplicateName(kind, name) => (
                StatusCode::CONFLICT,
                format!("Duplicate {kind}"),
                format!(
                    "A {kind} named \"{name}\" already exists. \
                    Choose a different name, or edit the existing {kind}."
                ),
            ),
            Error::InvalidReference(kind) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid {kind}"),
                format!(
                    "The selected {kind} does not exist. \
                    Try refreshing the page to see the latest entries."
                ),
            ),
            Error::CategoryTypeMismatch | Error::SubcategoryCategoryMismatch => (
                StatusCode::BAD_REQUEST,
                "Invalid category".to_owned(),
                self.to_string(),
            ),
            Error::AmountTooSmall
            | Error::AmountTooPrecise
            | Error::AmountTooLarge
            | Error::InvalidAmount(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid amount".to_owned(),
                self.to_string(),
            ),
            Error::InvalidDate(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid date".to_owned(),
                self.to_string(),
            ),
            Error::DeleteInUse(kind) => (
                StatusCode::CONFLICT,
                format!("Could not delete {kind}"),
                format!(
                    "The {kind} is used by one or more transactions. \
                    Change or delete those transactions first."
                ),
            ),
            Error::MoveInUse(kind) => (
                StatusCode::CONFLICT,
                format!("Could not move {kind}"),
                format!(
                    "The {kind} is used by one or more transactions, \
                    so it must stay under its current parent. Create a new {kind} instead."
                ),
            ),
            Error::UpdateMissing(kind) => (
                StatusCode::NOT_FOUND,
                format!("Could not update {kind}"),
                format!("The {kind} could not be found."),
            ),
            Error::DeleteMissing(kind) => (
                StatusCode::NOT_FOUND,
                format!("Could not delete {kind}"),
                format!(
                    "The {kind} could not be found. \
                    Try refreshing the page to see if the {kind} has already been deleted."
                ),
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings".to_owned(),
                format!("Could not get local timezone \"{timezone}\". {TIMEZONE_FIX}"),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_owned(),
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        (status_code, Alert::Error { message, details }).into_response()
    }
}

/// Parse a date in the `YYYY-MM-DD` format used by HTML date inputs.
fn parse_date(text: &str) -> Result<Date, Error> {
    let format = time::macros::format_description!("[year]-[month]-[day]");

    Date::parse(text.trim(), format).map_err(|_| Error::InvalidDate(text.to_owned()))
}
