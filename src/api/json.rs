use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::Error;

/// The body of every JSON error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// A message that can be shown to the user.
    pub error: String,
}

/// Unwrap a JSON request body, turning a malformed body into [Error::InvalidRequestBody].
///
/// Handlers take `Result<Json<T>, JsonRejection>` so that the rejection is
/// rendered as a JSON error instead of axum's plain text response.
pub fn parse_json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            tracing::debug!("Rejected JSON body: {rejection}");
            Error::InvalidRequestBody(rejection.body_text())
        })
}

/// An [Error] that is rendered as a JSON response.
#[derive(Debug, PartialEq)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.into_json_response()
    }
}

/// The result type of the JSON API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
