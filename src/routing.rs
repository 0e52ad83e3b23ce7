//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    api::{get_api_docs, method_not_allowed},
    auth::{
        auth_guard, auth_guard_api, auth_guard_hx, get_log_in_page, get_log_out, oauth_callback,
        start_github_auth,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    movement::{
        create_movement_endpoint, create_movement_form_endpoint, get_create_movement_page,
        get_movements_page, list_movements,
    },
    not_found::get_404_not_found,
    report::{get_report_csv, get_report_html, get_report_stats, get_reports_page},
    user::{
        get_edit_user_page, get_users_page, list_users, update_user_endpoint,
        update_user_form_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::GITHUB_AUTH, get(start_github_auth))
        .route(endpoints::OAUTH_CALLBACK, get(oauth_callback))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(
            endpoints::API_DOCS,
            get(get_api_docs).fallback(|| async { method_not_allowed("GET") }),
        );

    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::MOVEMENTS_VIEW, get(get_movements_page))
        .route(endpoints::NEW_MOVEMENT_VIEW, get(get_create_movement_page))
        .route(endpoints::USERS_VIEW, get(get_users_page))
        .route(endpoints::EDIT_USER_VIEW, get(get_edit_user_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::REPORT_CSV, get(get_report_csv))
        .route(endpoints::REPORT_HTML, get(get_report_html))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // Forms are submitted by htmx, so auth redirects must use the HX-Redirect header.
    let form_routes = Router::new()
        .route(endpoints::MOVEMENTS_FORM, post(create_movement_form_endpoint))
        .route(endpoints::USER_FORM, put(update_user_form_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    // The guard wraps the method fallbacks too, so unauthenticated requests
    // get a 401 before any 405.
    let api_routes = Router::new()
        .route(
            endpoints::MOVEMENTS_API,
            get(list_movements)
                .post(create_movement_endpoint)
                .fallback(|| async { method_not_allowed("GET, POST") }),
        )
        .route(
            endpoints::USERS_API,
            get(list_users)
                .put(update_user_endpoint)
                .fallback(|| async { method_not_allowed("GET, PUT") }),
        )
        .route(
            endpoints::REPORT_STATS_API,
            get(get_report_stats).fallback(|| async { method_not_allowed("GET") }),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_guard_api,
        ));

    page_routes
        .merge(form_routes)
        .merge(api_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{AppState, Error, Identity, IdentityProvider, auth::COOKIE_TOKEN, endpoints};

    use super::build_router;

    const AUTHORIZE_URL: &str = "https://provider.example/authorize";

    struct FakeProvider;

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        fn authorization_url(&self, state: &str) -> String {
            format!("{AUTHORIZE_URL}?state={state}")
        }

        async fn exchange_code(&self, _code: &str) -> Result<Identity, Error> {
            Ok(Identity {
                name: "Ada Lovelace".to_owned(),
                email: "ada@example.com".to_owned(),
            })
        }
    }

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "test secret",
            "Etc/UTC",
            Arc::new(FakeProvider),
        )
        .unwrap();

        TestServer::new(build_router(state))
    }

    /// Sign in through the OAuth flow and return the session cookie.
    async fn sign_in(server: &TestServer) -> Cookie<'static> {
        let start = server.get(endpoints::GITHUB_AUTH).await;
        let location = start.header("location");
        let state = location
            .to_str()
            .unwrap()
            .strip_prefix(&format!("{AUTHORIZE_URL}?state="))
            .unwrap()
            .to_owned();

        let callback = server
            .get(endpoints::OAUTH_CALLBACK)
            .add_cookies(start.cookies())
            .add_query_param("code", "code")
            .add_query_param("state", state)
            .await;
        callback.assert_status_see_other();
        assert_eq!(callback.header("location"), endpoints::DASHBOARD_VIEW);

        callback.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_when_signed_out() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::MOVEMENTS_VIEW,
            endpoints::USERS_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::REPORT_CSV,
        ] {
            let response = server.get(page).await;

            response.assert_status_see_other();
            let want = format!(
                "{}?{}",
                endpoints::LOG_IN_VIEW,
                serde_urlencoded::to_string([("redirect_url", page)]).unwrap()
            );
            assert_eq!(response.header("location"), want.as_str());
        }
    }

    #[tokio::test]
    async fn api_is_unauthorized_when_signed_out() {
        let server = get_test_server();

        let response = server.get(endpoints::MOVEMENTS_API).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"error": "No autenticado"}));

        let response = server.delete(endpoints::MOVEMENTS_API).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unsupported_api_method_is_not_allowed() {
        let server = get_test_server();
        let session = sign_in(&server).await;

        let response = server
            .delete(endpoints::USERS_API)
            .add_cookie(session)
            .await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), "GET, PUT");
        response.assert_json(&json!({"error": "Método no permitido"}));
    }

    #[tokio::test]
    async fn signed_in_user_can_record_movement_and_see_report() {
        let server = get_test_server();
        let session = sign_in(&server).await;

        let users = server
            .get(endpoints::USERS_API)
            .add_cookie(session.clone())
            .await;
        users.assert_status_ok();
        let user_id = users.json::<serde_json::Value>()["users"][0]["id"].clone();

        let created = server
            .post(endpoints::MOVEMENTS_API)
            .add_cookie(session.clone())
            .json(&json!({
                "concept": "Sueldo",
                "amount": 1500,
                "date": "2025-01-31",
                "type": "INCOME",
                "userId": user_id
            }))
            .await;
        created.assert_status(StatusCode::CREATED);

        let stats = server
            .get(endpoints::REPORT_STATS_API)
            .add_cookie(session.clone())
            .await;
        stats.assert_status_ok();
        let stats = stats.json::<serde_json::Value>();
        assert_eq!(stats["totalIngresos"], 1500.0);
        assert_eq!(stats["saldo"], 1500.0);

        server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(session)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn log_out_ends_session() {
        let server = get_test_server();
        let session = sign_in(&server).await;

        let response = server
            .get(endpoints::LOG_OUT)
            .add_cookie(session)
            .await;
        response.assert_status_see_other();

        server
            .get(endpoints::MOVEMENTS_API)
            .add_cookies(response.cookies())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_page_and_api_docs_are_public() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();

        let docs = server.get(endpoints::API_DOCS).await;
        docs.assert_status_ok();
        assert!(docs.json::<serde_json::Value>()["openapi"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
