//! Sessions, the auth guards and signing in with an identity provider.

mod cookie;
mod identity;
mod log_in;
mod log_out;
mod middleware;
mod oauth;
mod redirect;
mod token;

pub use cookie::COOKIE_TOKEN;
pub use identity::{GitHubProvider, Identity, IdentityProvider};
pub use log_in::get_log_in_page;
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_api, auth_guard_hx};
pub use oauth::{oauth_callback, start_github_auth};
