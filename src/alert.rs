//! Alerts for displaying error messages after htmx requests.
//!
//! Alerts are swapped into the `#alert-container` element that [crate::html::base]
//! places at the bottom of every page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable error message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// What went wrong.
    pub message: String,
    /// How to fix it. Omitted when empty.
    pub details: String,
}

const ERROR_STYLE: &str = "flex items-start p-4 mb-4 text-red-800 rounded-lg \
    bg-red-50 dark:bg-gray-800 dark:text-red-400 border border-red-300 \
    dark:border-red-800 shadow";

impl Alert {
    pub fn into_html(self) -> Markup {
        let Alert { message, details } = self;

        html! {
            div
                role="alert"
                class=(ERROR_STYLE)
            {
                div class="ms-3 text-sm"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    class="ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex items-center \
                        justify-center h-8 w-8 hover:bg-gray-200 dark:hover:bg-gray-700"
                    aria-label="Cerrar"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "✕"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
