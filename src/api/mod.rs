//! Shared pieces of the JSON API: the error body, request body parsing,
//! `405 Method Not Allowed` responses and the OpenAPI document.

mod docs;
mod json;
mod method_not_allowed;

pub use docs::get_api_docs;
pub use json::{ApiResult, ErrorBody, parse_json_body};
pub use method_not_allowed::method_not_allowed;
