use axum::{
    Json,
    http::{StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};

use crate::{Error, api::ErrorBody};

/// A `405 Method Not Allowed` JSON response listing the methods in `allow`,
/// e.g. "GET, POST".
pub fn method_not_allowed(allow: &'static str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, allow)],
        Json(ErrorBody {
            error: Error::MethodNotAllowed.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod method_not_allowed_tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_json_error, get_header};

    use super::method_not_allowed;

    #[tokio::test]
    async fn lists_allowed_methods() {
        let response = method_not_allowed("GET, PUT");

        assert_eq!(get_header(&response, "allow"), "GET, PUT");
        assert_json_error(response, StatusCode::METHOD_NOT_ALLOWED, "Método no permitido").await;
    }
}
