//! The sign-in page. Signing in itself is delegated to the identity provider,
//! see [crate::auth::oauth].

use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{cookie::get_token_from_cookies, redirect::normalize_redirect_url},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
};

/// Why an attempt to sign in failed.
///
/// The code is passed back to the sign-in page in the `error` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInError {
    /// The user declined to authorize the app.
    AccessDenied,
    /// The `state` returned by the provider did not match ours.
    StateMismatch,
    /// The provider could not be reached or rejected the code.
    ProviderFailed,
    /// Any other error on our side.
    Internal,
}

impl SignInError {
    /// The value used in the `error` query parameter.
    pub fn code(&self) -> &'static str {
        match self {
            SignInError::AccessDenied => "access_denied",
            SignInError::StateMismatch => "state_mismatch",
            SignInError::ProviderFailed => "provider_failed",
            SignInError::Internal => "internal",
        }
    }

    fn from_code(code: &str) -> Self {
        match code {
            "access_denied" => SignInError::AccessDenied,
            "state_mismatch" => SignInError::StateMismatch,
            "provider_failed" => SignInError::ProviderFailed,
            _ => SignInError::Internal,
        }
    }

    /// The message shown on the sign-in page.
    pub fn message(&self) -> &'static str {
        match self {
            SignInError::AccessDenied => "Se canceló el inicio de sesión con GitHub.",
            SignInError::StateMismatch => {
                "La solicitud de inicio de sesión expiró o no es válida. Inténtelo de nuevo."
            }
            SignInError::ProviderFailed => {
                "No se pudo verificar su identidad con GitHub. Inténtelo de nuevo."
            }
            SignInError::Internal => "Ocurrió un error al iniciar sesión. Inténtelo de nuevo.",
        }
    }

    /// The sign-in page URL that shows this error.
    pub fn log_in_url(&self) -> String {
        format!("{}?error={}", endpoints::LOG_IN_VIEW, self.code())
    }
}

/// The query parameters accepted by the sign-in page.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogInQuery {
    /// Where to send the user once they have signed in.
    pub redirect_url: Option<String>,
    /// A [SignInError] code from a failed attempt.
    pub error: Option<String>,
}

pub(crate) fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

fn github_auth_url(redirect_url: Option<&str>) -> String {
    let Some(redirect_url) = redirect_url else {
        return endpoints::GITHUB_AUTH.to_owned();
    };

    match serde_urlencoded::to_string([("redirect_url", redirect_url)]) {
        Ok(query) => format!("{}?{}", endpoints::GITHUB_AUTH, query),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_url}: {error}");
            endpoints::GITHUB_AUTH.to_owned()
        }
    }
}

fn log_in_view(redirect_url: Option<&str>, error: Option<SignInError>) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full mt-16 bg-white rounded-lg shadow dark:border
                dark:bg-gray-800 dark:border-gray-700 p-6 space-y-6 sm:p-8"
            {
                div class="space-y-2 text-center"
                {
                    h1 class="text-2xl font-bold leading-tight tracking-tight
                        text-gray-900 md:text-3xl dark:text-white"
                    {
                        "Bienvenid@"
                    }

                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Sistema de Gestión de Ingresos y Egresos"
                    }
                }

                @if let Some(error) = error {
                    p
                        id="log-in-error"
                        role="alert"
                        class="p-3 text-sm text-red-800 rounded bg-red-50
                            dark:bg-gray-700 dark:text-red-400"
                    {
                        (error.message())
                    }
                }

                h2 class="text-lg font-semibold text-gray-900 dark:text-white" { "Iniciar Sesión" }

                a
                    id="github-log-in"
                    href=(github_auth_url(redirect_url))
                    class={ "block text-center " (BUTTON_PRIMARY_STYLE) }
                {
                    "Continuar con GitHub"
                }
            }
        }
    };

    base("Iniciar Sesión", &[], &content)
}

/// Display the sign-in page.
///
/// Users who already have a valid session are sent straight on to the
/// requested page, or the dashboard if none was given.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>, jar: PrivateCookieJar) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "sign-in query");

    if get_token_from_cookies(&jar).is_ok() {
        let target = redirect_url.as_deref().unwrap_or(endpoints::DASHBOARD_VIEW);
        return Redirect::to(target).into_response();
    }

    let error = query.error.as_deref().map(SignInError::from_code);

    log_in_view(redirect_url.as_deref(), error).into_response()
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{
        Router,
        extract::State,
        routing::{get, post},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use sha2::Digest;

    use crate::{
        Error,
        auth::{COOKIE_TOKEN, cookie::set_auth_cookie, middleware::AuthState},
        config::{SESSION_DURATION, SESSION_UPDATE_AGE},
        endpoints,
        test_utils::assert_valid_html,
        user::UserID,
    };

    use super::{SignInError, get_log_in_page};

    fn get_state() -> AuthState {
        AuthState {
            cookie_key: Key::from(&sha2::Sha512::digest("foobar")),
            session_duration: SESSION_DURATION,
            session_update_age: SESSION_UPDATE_AGE,
        }
    }

    const TEST_LOG_IN_ROUTE: &str = "/test_log_in";

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), state.session_duration)
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(get_state());

        TestServer::new(app)
    }

    fn github_link_href(html: &Html) -> String {
        html.select(&Selector::parse("a#github-log-in").unwrap())
            .next()
            .expect("No GitHub sign-in link")
            .value()
            .attr("href")
            .unwrap_or_default()
            .to_owned()
    }

    #[tokio::test]
    async fn log_in_page_displays_greeting_and_github_link() {
        let server = get_test_server();

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        let text = response.text();
        assert!(text.contains("Bienvenid@"));
        assert!(text.contains("Sistema de Gestión de Ingresos y Egresos"));
        assert!(text.contains("Iniciar Sesión"));
        assert!(text.contains("Continuar con GitHub"));
        assert_eq!(github_link_href(&html), endpoints::GITHUB_AUTH);
    }

    #[tokio::test]
    async fn log_in_page_passes_redirect_url_to_github_link() {
        let server = get_test_server();

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_query_param("redirect_url", "/movements")
            .await;

        let html = Html::parse_document(&response.text());
        assert_eq!(
            github_link_href(&html),
            format!("{}?redirect_url=%2Fmovements", endpoints::GITHUB_AUTH)
        );
    }

    #[tokio::test]
    async fn log_in_page_drops_external_redirect_url() {
        let server = get_test_server();

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_query_param("redirect_url", "https://evil.example/")
            .await;

        let html = Html::parse_document(&response.text());
        assert_eq!(github_link_href(&html), endpoints::GITHUB_AUTH);
    }

    #[tokio::test]
    async fn log_in_page_shows_error_message() {
        let server = get_test_server();

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_query_param("error", SignInError::StateMismatch.code())
            .await;

        let html = Html::parse_document(&response.text());
        let error = html
            .select(&Selector::parse("#log-in-error").unwrap())
            .next()
            .expect("No error message");
        assert_eq!(
            error.text().collect::<String>().trim(),
            SignInError::StateMismatch.message()
        );
    }

    #[tokio::test]
    async fn signed_in_user_is_sent_to_dashboard() {
        let server = get_test_server();
        let cookie = server.post(TEST_LOG_IN_ROUTE).await.cookie(COOKIE_TOKEN);

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_cookie(cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[test]
    fn unknown_error_code_is_internal() {
        assert_eq!(SignInError::from_code("???"), SignInError::Internal);
        assert_eq!(
            SignInError::from_code(SignInError::AccessDenied.code()),
            SignInError::AccessDenied
        );
    }
}
