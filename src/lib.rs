//! Cashbook is a web app for recording income and expense movements,
//! reviewing monthly reports and managing the users who can sign in.
//!
//! This library provides a REST API that directly serves HTML pages, plus a
//! small JSON API used by scripts and other clients.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod auth;
mod config;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod movement;
mod navigation;
mod not_found;
mod report;
mod routing;
mod timezone;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{GitHubProvider, Identity, IdentityProvider};
pub use config::{DEFAULT_NEW_USER_ROLE, OAuthConfig, SESSION_DURATION, SESSION_UPDATE_AGE};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use movement::{Movement, MovementType, NewMovement, create_movement, get_movement};
pub use report::{MonthlyBreakdown, Report, ReportEntry, aggregate};
pub use routing::build_router;
pub use user::{Role, User, UserID, find_or_create_user, get_user_by_email, get_user_by_id};

use crate::{
    alert::Alert, api::ErrorBody, internal_server_error::InternalServerError,
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
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The generic message shown to clients when an unexpected error occurs.
///
/// The details of such errors are only ever written to the server logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// The errors that may occur in the application.
///
/// The messages of the validation variants are shown to the client as is.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// At least one of the fields needed to create a movement was missing or empty.
    #[error("Concepto, monto, fecha, tipo y usuario son requeridos")]
    MissingMovementFields,

    /// The movement type was not one of `INCOME` or `EXPENSE`.
    #[error("Tipo inválido. Debe ser INCOME o EXPENSE")]
    InvalidMovementType(String),

    /// The amount could not be parsed as a positive, finite number.
    #[error("Monto inválido: \"{0}\". Debe ser un número mayor que cero")]
    InvalidAmount(String),

    /// The date could not be parsed as a calendar date.
    #[error("Fecha inválida: \"{0}\". Use el formato AAAA-MM-DD")]
    InvalidDate(String),

    /// The user ID given for a new movement does not refer to a registered user.
    #[error("El usuario {0} no existe")]
    InvalidUser(UserID),

    /// At least one of the fields needed to update a user was missing or empty.
    #[error("ID, nombre y rol son requeridos")]
    MissingUserFields,

    /// The role was not one of `USER` or `ADMIN`.
    #[error("Rol inválido. Debe ser USER o ADMIN")]
    InvalidRole(String),

    /// The request body could not be parsed as JSON of the expected shape.
    #[error("Cuerpo de la solicitud inválido: {0}")]
    InvalidRequestBody(String),

    /// The HTTP method is not supported by the requested resource.
    #[error("Método no permitido")]
    MethodNotAllowed,

    /// The request did not carry a valid session.
    #[error("No autenticado")]
    Unauthenticated,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The session cookie could not be decoded into a token.
    #[error("the session cookie does not contain a valid token")]
    InvalidToken,

    /// The session token has expired.
    #[error("the session has expired")]
    SessionExpired,

    /// The session token could not be serialized.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not serialize the session token: {0}")]
    TokenSerialization(String),

    /// The OAuth `state` parameter did not match the one stored before the
    /// redirect to the identity provider.
    #[error("the OAuth state parameter does not match")]
    OAuthStateMismatch,

    /// The identity provider rejected the authorization code or returned
    /// an unexpected response.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not exchange the authorization code: {0}")]
    OAuthExchange(String),

    /// The report could not be written as CSV.
    #[error("could not write the CSV report: {0}")]
    CsvExport(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("No se encontró el recurso solicitado")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
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

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Zona horaria inválida",
                fix: &format!(
                    "No se pudo obtener la zona horaria \"{timezone}\". Revise la configuración \
                    del servidor y asegúrese de usar un nombre de zona horaria canónico."
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// The status code used when this error is returned by a JSON endpoint.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingMovementFields
            | Error::InvalidMovementType(_)
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidUser(_)
            | Error::MissingUserFields
            | Error::InvalidRole(_)
            | Error::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated
            | Error::CookieMissing
            | Error::InvalidToken
            | Error::SessionExpired => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as a JSON body of the form `{"error": "..."}`.
    ///
    /// Server errors are logged and replaced with [INTERNAL_ERROR_MESSAGE].
    pub(crate) fn into_json_response(self) -> Response {
        let status = self.status_code();

        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", self);
                INTERNAL_ERROR_MESSAGE.to_owned()
            }
            StatusCode::UNAUTHORIZED => Error::Unauthenticated.to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub(crate) fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::MissingMovementFields
            | Error::InvalidMovementType(_)
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidUser(_) => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: "No se pudo crear el movimiento".to_owned(),
                    details: self.to_string(),
                },
            ),
            Error::MissingUserFields | Error::InvalidRole(_) => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: "No se pudo actualizar el usuario".to_owned(),
                    details: self.to_string(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "No encontrado".to_owned(),
                    details: "El recurso no existe. \
                    Recargue la página para ver los datos más recientes."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert {
                    message: "Zona horaria inválida".to_owned(),
                    details: format!(
                        "No se pudo obtener la zona horaria \"{timezone}\". Revise la \
                        configuración del servidor."
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert {
                        message: "Algo salió mal".to_owned(),
                        details: "Ocurrió un error inesperado, revise los registros del \
                        servidor para más detalles."
                            .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
