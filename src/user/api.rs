//! JSON endpoints for listing and updating users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    AppState, Error,
    api::{ApiResult, ErrorBody, parse_json_body},
    user::{Role, User, UserID, get_all_users, update_user},
};

/// The state needed by the users API.
#[derive(Debug, Clone)]
pub struct UsersApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UsersApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for listing users.
#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// The response body for an updated user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

/// The request body for changing a user's name and role.
///
/// Every field is optional here so that a missing field is reported with a
/// friendly message instead of a deserialization error.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Either "USER" or "ADMIN".
    #[serde(default)]
    pub role: Option<String>,
}

/// A checked [UpdateUserRequest].
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub id: UserID,
    pub name: String,
    pub role: Role,
}

impl UpdateUserRequest {
    /// Check that every field is present and that the role is known.
    ///
    /// A zero ID and a blank name count as missing.
    ///
    /// # Errors
    /// Returns [Error::MissingUserFields] if a field is missing, or
    /// [Error::InvalidRole] if the role is not "USER" or "ADMIN".
    pub fn validate(self) -> Result<UserUpdate, Error> {
        let id = self.id.filter(|id| *id != 0);
        let name = self
            .name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        let role = self.role.filter(|role| !role.is_empty());

        let (Some(id), Some(name), Some(role)) = (id, name, role) else {
            return Err(Error::MissingUserFields);
        };

        Ok(UserUpdate {
            id: UserID::new(id),
            name,
            role: role.parse()?,
        })
    }
}

/// List every user, ordered by name.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Todos los usuarios", body = UsersResponse),
        (status = 401, description = "No autenticado", body = ErrorBody),
        (status = 405, description = "Método no permitido", body = ErrorBody),
        (status = 500, description = "Error interno del servidor", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(State(state): State<UsersApiState>) -> ApiResult<Json<UsersResponse>> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let users = get_all_users(&connection)?;

    Ok(Json(UsersResponse { users }))
}

/// Change the name and role of a user.
#[utoipa::path(
    put,
    path = "/api/users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "El usuario actualizado", body = UserResponse),
        (status = 400, description = "Faltan campos o el rol es inválido", body = ErrorBody),
        (status = 401, description = "No autenticado", body = ErrorBody),
        (status = 404, description = "Usuario no encontrado", body = ErrorBody),
        (status = 500, description = "Error interno del servidor", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
pub async fn update_user_endpoint(
    State(state): State<UsersApiState>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let update = parse_json_body(payload)?.validate()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = update_user(update.id, &update.name, update.role, &connection)?;
    tracing::info!("Updated user {} to role {}", user.id, user.role);

    Ok(Json(UserResponse { user }))
}
