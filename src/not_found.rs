//! The page shown when a route or resource does not exist.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for routes that do not match any other route.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "No encontrado",
        "404",
        "Página no encontrada",
        "La página que busca no existe o fue movida.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}
