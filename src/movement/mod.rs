//! Income and expense movements: storage, validation, the JSON API and the
//! pages for listing and recording them.

pub(crate) mod api;
mod core;
mod create_endpoint;
mod create_page;
mod movements_page;

pub use api::{
    CreateMovementRequest, MovementAmount, MovementResponse, MovementsResponse,
    create_movement_endpoint, list_movements,
};
#[cfg(test)]
pub use core::count_movements;
pub use core::{
    Movement, MovementType, MovementWithUser, NewMovement, UserName, create_movement,
    create_movement_table, get_all_movements, get_movement, get_movement_with_user,
    get_report_entries,
};
pub use create_endpoint::create_movement_form_endpoint;
pub use create_page::get_create_movement_page;
pub use movements_page::{format_date, get_movements_page};
