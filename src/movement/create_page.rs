//! The page for recording a new movement.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner,
    },
    movement::MovementType,
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the new movement page.
#[derive(Debug, Clone)]
pub struct CreateMovementPageState {
    /// The local timezone as a canonical timezone name, e.g. "America/Bogota".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateMovementPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for recording a movement.
pub async fn get_create_movement_page(
    State(state): State<CreateMovementPageState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    Ok(create_movement_view(today).into_response())
}

fn create_movement_view(today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_MOVEMENT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::MOVEMENTS_FORM)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Nuevo Movimiento" }

                div
                {
                    label for="concept" class=(FORM_LABEL_STYLE) { "Concepto" }

                    input
                        name="concept"
                        id="concept"
                        type="text"
                        placeholder="Ej. Pago de nómina"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Monto" }

                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Fecha" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(today)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Tipo" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for movement_type in MovementType::ALL {
                            @let id = format!("type-{}", movement_type.as_str().to_lowercase());

                            label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                            {
                                input
                                    id=(id)
                                    type="radio"
                                    name="type"
                                    value=(movement_type.as_str())
                                    required
                                    checked[movement_type == MovementType::Income]
                                    class=(FORM_RADIO_INPUT_STYLE);

                                span { (movement_type.label()) }
                            }
                        }
                    }
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    " Guardar Movimiento"
                }
            }
        }
    };

    base("Nuevo Movimiento", &[], &content)
}
