//! OpenAPI documentation for the JSON API.

use axum::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::{
    api::ErrorBody,
    auth::COOKIE_TOKEN,
    movement::{
        CreateMovementRequest, MovementAmount, MovementResponse, MovementType, MovementWithUser,
        MovementsResponse, UserName,
    },
    report::{MonthlyBreakdown, Report},
    user::{Role, UpdateUserRequest, User, UserID, UserResponse, UsersResponse},
};

/// Add the session cookie security scheme to the generated document.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                COOKIE_TOKEN,
                "Cookie de sesión emitida al iniciar sesión con GitHub.",
            ))),
        );
    }
}

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieAddon),
    info(
        title = "API de Gestión de Ingresos y Egresos",
        description = "Movimientos, usuarios y reportes financieros."
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::movement::api::list_movements,
        crate::movement::api::create_movement_endpoint,
        crate::user::api::list_users,
        crate::user::api::update_user_endpoint,
        crate::report::stats_endpoint::get_report_stats,
    ),
    components(schemas(
        ErrorBody,
        CreateMovementRequest,
        MovementAmount,
        MovementType,
        MovementWithUser,
        MovementResponse,
        MovementsResponse,
        UserName,
        UpdateUserRequest,
        User,
        UserID,
        Role,
        UserResponse,
        UsersResponse,
        Report,
        MonthlyBreakdown,
    )),
    tags(
        (name = "movements", description = "Ingresos y egresos"),
        (name = "users", description = "Gestión de usuarios"),
        (name = "reports", description = "Reportes financieros")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn get_api_docs() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
