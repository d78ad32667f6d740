//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that htmx swaps into the
//! `#alert-container` element of the base page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// An alert message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// An error message with details on how to fix it.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div
                role="alert"
                class={ "flex items-start gap-3 p-4 mb-4 rounded shadow " (container_style) }
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="text-lg leading-none bg-transparent border-none cursor-pointer"
                    onclick="this.closest('#alert-container').classList.add('hidden')"
                {
                    "×"
                }
            }

            // Show the container this fragment was swapped into.
            script { "document.getElementById('alert-container').classList.remove('hidden');" }
        }
    }
}

const ERROR_STYLE: &str = "text-red-800 bg-red-50 border border-red-300 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
