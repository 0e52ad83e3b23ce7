//! User editing page and form endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
    user::{Role, UpdateUserRequest, User, UserID, get_user_by_id, update_user},
};

/// The state needed for the edit user page and its form endpoint.
#[derive(Debug, Clone)]
pub struct EditUserState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of the edit user form.
#[derive(Debug, Clone, Deserialize)]
pub struct UserFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Render the page for editing a user's name and role.
pub async fn get_edit_user_page(
    Path(user_id): Path<i64>,
    State(state): State<EditUserState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(UserID::new(user_id), &connection)
        .inspect_err(|error| match error {
            Error::NotFound => {}
            error => tracing::error!("Failed to retrieve user {user_id}: {error}"),
        })?;

    Ok(edit_user_view(&user).into_response())
}

/// Handle the edit user form submission.
///
/// Redirects to the users page on success, otherwise responds with an alert.
pub async fn update_user_form_endpoint(
    Path(user_id): Path<i64>,
    State(state): State<EditUserState>,
    Form(form): Form<UserFormData>,
) -> Response {
    let request = UpdateUserRequest {
        id: Some(user_id),
        name: Some(form.name),
        role: Some(form.role),
    };

    let update = match request.validate() {
        Ok(update) => update,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_user(update.id, &update.name, update.role, &connection) {
        Ok(user) => {
            tracing::info!("Updated user {} to role {}", user.id, user.role);
            (
                HxRedirect(endpoints::USERS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

fn edit_user_view(user: &User) -> Markup {
    let nav_bar = NavBar::new(endpoints::USERS_VIEW).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::USER_FORM, user.id.as_i64());

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Editar Usuario" }

            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { "Correo" }

                    input
                        id="email"
                        type="email"
                        value=(user.email)
                        disabled
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Nombre" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        value=(user.name)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="role" class=(FORM_LABEL_STYLE) { "Rol" }

                    select id="role" name="role" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for role in Role::ALL {
                            option value=(role.as_str()) selected[role == user.role]
                            {
                                (role.label())
                            }
                        }
                    }
                }

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    "Guardar"
                }
            }
        }
    };

    base("Editar Usuario", &[], &content)
}
