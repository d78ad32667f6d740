//! The page shown when the ledger cannot complete a request.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A 500 page with a description of what failed and how to fix it.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, the ledger could not complete your request.",
            fix: "Try again, and if it keeps happening check debug.log on the server.",
        }
    }
}

impl InternalServerError<'_> {
    /// The page for when the shared database connection cannot be used.
    pub fn database_unavailable() -> Self {
        Self {
            description: "The ledger database is not available.",
            fix: "Restart the server. If that does not help, check debug.log for the cause.",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}
