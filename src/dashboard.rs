//! The landing page for signed-in users.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    user::{UserID, get_user_by_id},
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for looking up the signed-in user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct SectionCard {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    url: &'static str,
    action: &'static str,
}

const SECTION_CARDS: [SectionCard; 3] = [
    SectionCard {
        id: "movements-card",
        title: "Movimientos",
        description: "Registra y gestiona todos tus ingresos y egresos de manera eficiente",
        url: endpoints::MOVEMENTS_VIEW,
        action: "Gestionar Movimientos",
    },
    SectionCard {
        id: "users-card",
        title: "Usuarios",
        description: "Administra usuarios del sistema y controla sus permisos de acceso",
        url: endpoints::USERS_VIEW,
        action: "Gestionar Usuarios",
    },
    SectionCard {
        id: "reports-card",
        title: "Reportes",
        description: "Visualiza estadísticas detalladas y exporta reportes financieros",
        url: endpoints::REPORTS_VIEW,
        action: "Ver Reportes",
    },
];

fn section_card(card: &SectionCard) -> Markup {
    html! {
        div
            id=(card.id)
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-6 shadow-md
                hover:shadow-lg transition-shadow flex flex-col justify-between gap-4"
        {
            div
            {
                h3 class="text-xl font-semibold mb-2" { (card.title) }
                p class="text-sm text-gray-600 dark:text-gray-400" { (card.description) }
            }

            a href=(card.url) class=(LINK_STYLE) { (card.action) }
        }
    }
}

fn dashboard_view(user_name: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-screen-xl mx-auto"
            {
                div class="mb-8"
                {
                    h2 class="text-3xl font-bold" { "Panel de Control" }
                    p id="greeting" class="mt-2 text-gray-600 dark:text-gray-400"
                    {
                        "Hola, " span class="font-medium" { (user_name) }
                    }
                    p class="mt-1 text-gray-600 dark:text-gray-400"
                    {
                        "Gestiona tus finanzas de manera inteligente con nuestro sistema completo"
                    }
                }

                div class="grid grid-cols-1 md:grid-cols-3 gap-4"
                {
                    @for card in &SECTION_CARDS {
                        (section_card(card))
                    }
                }
            }
        }
    };

    base("Inicio", &[], &content)
}

/// Display the landing page with links to each section of the app.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let user = {
        let connection = match state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
        {
            Ok(connection) => connection,
            Err(error) => return error.into_response(),
        };

        match get_user_by_id(user_id, &connection) {
            Ok(user) => user,
            Err(error) => {
                tracing::error!("Could not get signed-in user {user_id}: {error}");
                return error.into_response();
            }
        }
    };

    dashboard_view(&user.name).into_response()
}
