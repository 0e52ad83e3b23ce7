//! The page listing every movement.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error, endpoints,
    html::{
        BADGE_BLUE_STYLE, BADGE_PURPLE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, amount_style, base, format_currency,
    },
    movement::{MovementType, MovementWithUser, get_all_movements},
    navigation::NavBar,
};

/// The state needed for the movements page.
#[derive(Debug, Clone)]
pub struct MovementsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MovementsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the table of movements, newest first.
pub async fn get_movements_page(
    State(state): State<MovementsPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movements = get_all_movements(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve movements: {error}"))?;

    Ok(movements_view(&movements).into_response())
}

/// Format a date the way it is written in Colombia, e.g. "31/01/2025".
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// The amount with a sign that shows which way the money moved.
fn signed_amount(movement: &MovementWithUser) -> f64 {
    match movement.movement_type {
        MovementType::Income => movement.amount,
        MovementType::Expense => -movement.amount,
    }
}

fn type_badge(movement_type: MovementType) -> Markup {
    let style = match movement_type {
        MovementType::Income => BADGE_BLUE_STYLE,
        MovementType::Expense => BADGE_PURPLE_STYLE,
    };

    html!( span class=(style) data-type=(movement_type.as_str()) { (movement_type.label()) } )
}

fn movements_view(movements: &[MovementWithUser]) -> Markup {
    let nav_bar = NavBar::new(endpoints::MOVEMENTS_VIEW).into_html();

    let table_row = |movement: &MovementWithUser| {
        let amount = signed_amount(movement);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (movement.concept) }
                td class={(TABLE_CELL_STYLE) " " (amount_style(amount))} data-amount=(amount)
                {
                    @if amount > 0.0 { "+" }
                    (format_currency(amount))
                }
                td class=(TABLE_CELL_STYLE) { (format_date(movement.date)) }
                td class=(TABLE_CELL_STYLE) { (type_badge(movement.movement_type)) }
                td class=(TABLE_CELL_STYLE) { (movement.user.name) }
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
                    h1 class="text-xl font-bold" { "Ingresos y Egresos" }

                    a href=(endpoints::NEW_MOVEMENT_VIEW) class=(LINK_STYLE)
                    {
                        "Nuevo Movimiento"
                    }
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Concepto" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Monto" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Fecha" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Tipo" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Usuario" }
                            }
                        }

                        tbody
                        {
                            @for movement in movements {
                                (table_row(movement))
                            }

                            @if movements.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No hay movimientos registrados."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Movimientos", &[], &content)
}
