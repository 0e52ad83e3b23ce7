//! The htmx form endpoint for recording a movement.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    movement::{CreateMovementRequest, MovementAmount, create_movement},
    user::UserID,
};

/// The state needed for recording a movement from the form.
#[derive(Debug, Clone)]
pub struct CreateMovementFormState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateMovementFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of the new movement form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFormData {
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "type")]
    pub movement_type: String,
}

/// Record a movement for the signed-in user.
///
/// Redirects to the movements page on success, otherwise responds with an alert.
pub async fn create_movement_form_endpoint(
    State(state): State<CreateMovementFormState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<MovementFormData>,
) -> Response {
    let request = CreateMovementRequest {
        concept: Some(form.concept),
        amount: Some(MovementAmount::Text(form.amount)),
        date: Some(form.date),
        movement_type: Some(form.movement_type),
        user_id: Some(user_id.as_i64()),
    };

    let new_movement = match request.validate() {
        Ok(new_movement) => new_movement,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_movement(new_movement, &connection) {
        Ok(movement) => {
            tracing::info!("User {user_id} recorded movement {}", movement.id);
            (
                HxRedirect(endpoints::MOVEMENTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
