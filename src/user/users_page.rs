//! Users listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BADGE_BLUE_STYLE, BADGE_PURPLE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    user::{Role, User, get_all_users},
};

/// The state needed for the users listing page.
#[derive(Debug, Clone)]
pub struct UsersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UsersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page listing every user.
pub async fn get_users_page(State(state): State<UsersPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let users = get_all_users(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve users: {error}"))?;

    Ok(users_view(&users).into_response())
}

pub(crate) fn role_badge(role: Role) -> Markup {
    let style = match role {
        Role::Admin => BADGE_PURPLE_STYLE,
        Role::User => BADGE_BLUE_STYLE,
    };

    html!( span class=(style) data-role=(role.as_str()) { (role.label()) } )
}

fn users_view(users: &[User]) -> Markup {
    let nav_bar = NavBar::new(endpoints::USERS_VIEW).into_html();

    let table_row = |user: &User| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_USER_VIEW, user.id.as_i64());

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (user.name) }
                td class=(TABLE_CELL_STYLE) { (user.email) }
                td class=(TABLE_CELL_STYLE) { (user.phone.as_deref().unwrap_or("-")) }
                td class=(TABLE_CELL_STYLE) { (role_badge(user.role)) }
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Editar" }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-5xl lg:w-full"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Gestión de Usuarios" }
                }

                div class="dark:bg-gray-800 overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Nombre" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Correo" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Teléfono" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Rol" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Acciones" }
                            }
                        }

                        tbody
                        {
                            @for user in users {
                                (table_row(user))
                            }

                            @if users.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No hay usuarios registrados."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Usuarios", &[], &content)
}
