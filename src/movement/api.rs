//! JSON endpoints for listing and creating movements, and the validation
//! shared with the movement form.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use utoipa::ToSchema;

use crate::{
    AppState, Error,
    api::{ApiResult, ErrorBody, parse_json_body},
    movement::{
        MovementType, MovementWithUser, NewMovement, create_movement, get_all_movements,
        get_movement_with_user,
    },
    user::UserID,
};

/// The state needed by the movements API.
#[derive(Debug, Clone)]
pub struct MovementsApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MovementsApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for listing movements.
#[derive(Debug, Serialize, ToSchema)]
pub struct MovementsResponse {
    pub movements: Vec<MovementWithUser>,
}

/// The response body for a created movement.
#[derive(Debug, Serialize, ToSchema)]
pub struct MovementResponse {
    pub movement: MovementWithUser,
}

/// An amount sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MovementAmount {
    Number(f64),
    Text(String),
}

impl MovementAmount {
    fn is_missing(&self) -> bool {
        match self {
            MovementAmount::Number(number) => *number == 0.0,
            MovementAmount::Text(text) => text.trim().is_empty(),
        }
    }

    /// Parse the amount, which must be a positive, finite number.
    fn parse(&self) -> Result<f64, Error> {
        let amount = match self {
            MovementAmount::Number(number) => *number,
            MovementAmount::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidAmount(text.to_owned()))?,
        };

        if amount.is_finite() && amount > 0.0 {
            Ok(amount)
        } else {
            Err(Error::InvalidAmount(amount.to_string()))
        }
    }
}

/// The request body for recording a movement.
///
/// Every field is optional here so that a missing field is reported with a
/// friendly message instead of a deserialization error.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementRequest {
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub amount: Option<MovementAmount>,
    /// A calendar date, e.g. "2025-01-31".
    #[serde(default)]
    pub date: Option<String>,
    /// Either "INCOME" or "EXPENSE".
    #[serde(default, rename = "type")]
    pub movement_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl CreateMovementRequest {
    /// Check the request and convert it into a [NewMovement].
    ///
    /// Checks run in this order: every field is present, the type is known,
    /// the amount is a positive number and the date is a valid calendar date.
    /// Blank strings, a zero amount and a zero user ID count as missing.
    ///
    /// # Errors
    /// Returns [Error::MissingMovementFields], [Error::InvalidMovementType],
    /// [Error::InvalidAmount] or [Error::InvalidDate].
    pub fn validate(self) -> Result<NewMovement, Error> {
        let concept = self
            .concept
            .map(|concept| concept.trim().to_owned())
            .filter(|concept| !concept.is_empty());
        let amount = self.amount.filter(|amount| !amount.is_missing());
        let date = self.date.filter(|date| !date.trim().is_empty());
        let movement_type = self.movement_type.filter(|type_| !type_.is_empty());
        let user_id = self.user_id.filter(|id| *id != 0);

        let (Some(concept), Some(amount), Some(date), Some(movement_type), Some(user_id)) =
            (concept, amount, date, movement_type, user_id)
        else {
            return Err(Error::MissingMovementFields);
        };

        let movement_type = movement_type.parse::<MovementType>()?;
        let amount = amount.parse()?;
        let date = parse_date(&date)?;

        Ok(NewMovement {
            concept,
            amount,
            date,
            movement_type,
            user_id: UserID::new(user_id),
        })
    }
}

/// Parse a date like "2025-01-31". A full RFC 3339 date-time is also accepted
/// and truncated to its date.
fn parse_date(text: &str) -> Result<Date, Error> {
    let text = text.trim();

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(text, &Rfc3339).map(|date_time| date_time.date()))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// List every movement, newest first.
#[utoipa::path(
    get,
    path = "/api/movements",
    responses(
        (status = 200, description = "Todos los movimientos", body = MovementsResponse),
        (status = 401, description = "No autenticado", body = ErrorBody),
        (status = 405, description = "Método no permitido", body = ErrorBody),
        (status = 500, description = "Error interno del servidor", body = ErrorBody)
    ),
    tags = ["movements"],
    operation_id = "listMovements"
)]
pub async fn list_movements(
    State(state): State<MovementsApiState>,
) -> ApiResult<Json<MovementsResponse>> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movements = get_all_movements(&connection)?;

    Ok(Json(MovementsResponse { movements }))
}

/// Record a new income or expense.
#[utoipa::path(
    post,
    path = "/api/movements",
    request_body = CreateMovementRequest,
    responses(
        (status = 201, description = "El movimiento creado", body = MovementResponse),
        (status = 400, description = "Faltan campos o algún valor es inválido", body = ErrorBody),
        (status = 401, description = "No autenticado", body = ErrorBody),
        (status = 500, description = "Error interno del servidor", body = ErrorBody)
    ),
    tags = ["movements"],
    operation_id = "createMovement"
)]
pub async fn create_movement_endpoint(
    State(state): State<MovementsApiState>,
    payload: Result<Json<CreateMovementRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MovementResponse>)> {
    let new_movement = parse_json_body(payload)?.validate()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movement = create_movement(new_movement, &connection)?;
    let movement = get_movement_with_user(movement.id, &connection)?;

    Ok((StatusCode::CREATED, Json(MovementResponse { movement })))
}
