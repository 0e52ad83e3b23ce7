//! Users, their roles, and the pages and endpoints for managing them.

pub(crate) mod api;
mod core;
mod edit;
mod users_page;

pub use api::{
    UpdateUserRequest, UserResponse, UsersResponse, list_users, update_user_endpoint,
};
#[cfg(test)]
pub use core::count_users;
pub use core::{
    Role, User, UserID, create_user_table, find_or_create_user, get_all_users, get_user_by_email,
    get_user_by_id, update_user,
};
pub use edit::{get_edit_user_page, update_user_form_endpoint};
pub use users_page::get_users_page;
