//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/{user_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing all movements.
pub const MOVEMENTS_VIEW: &str = "/movements";
/// The page for creating a new movement.
pub const NEW_MOVEMENT_VIEW: &str = "/movements/new";
/// The page listing all users.
pub const USERS_VIEW: &str = "/users";
/// The page for editing a user's name and role.
pub const EDIT_USER_VIEW: &str = "/users/{user_id}/edit";
/// The page with the financial report.
pub const REPORTS_VIEW: &str = "/reports";
/// The financial report as a CSV file.
pub const REPORT_CSV: &str = "/reports/export.csv";
/// The financial report as a printable HTML document.
pub const REPORT_HTML: &str = "/reports/export.html";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route that starts the GitHub OAuth flow.
pub const GITHUB_AUTH: &str = "/auth/github";
/// The route the identity provider redirects back to after authorization.
pub const OAUTH_CALLBACK: &str = "/auth/callback";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/log_out";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The htmx form endpoint for creating a movement.
pub const MOVEMENTS_FORM: &str = "/forms/movements";
/// The htmx form endpoint for updating a user.
pub const USER_FORM: &str = "/forms/users/{user_id}";

/// The JSON route to list and create movements.
pub const MOVEMENTS_API: &str = "/api/movements";
/// The JSON route to list and update users.
pub const USERS_API: &str = "/api/users";
/// The JSON route for the aggregated report.
pub const REPORT_STATS_API: &str = "/api/reports/stats";
/// The OpenAPI document describing the JSON routes.
pub const API_DOCS: &str = "/api/docs";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MOVEMENTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_MOVEMENT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::USERS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_USER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REPORTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REPORT_CSV);
        assert_endpoint_is_valid_uri(endpoints::REPORT_HTML);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::GITHUB_AUTH);
        assert_endpoint_is_valid_uri(endpoints::OAUTH_CALLBACK);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::MOVEMENTS_FORM);
        assert_endpoint_is_valid_uri(endpoints::USER_FORM);

        assert_endpoint_is_valid_uri(endpoints::MOVEMENTS_API);
        assert_endpoint_is_valid_uri(endpoints::USERS_API);
        assert_endpoint_is_valid_uri(endpoints::REPORT_STATS_API);
        assert_endpoint_is_valid_uri(endpoints::API_DOCS);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::EDIT_USER_VIEW, 7);

        assert_eq!(formatted_path, "/users/7/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
