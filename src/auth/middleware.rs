//! Authentication middleware that validates the session cookie, renews
//! sessions and turns away unauthenticated requests.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        cookie::{get_token_from_cookies, renew_auth_cookie_if_due},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    config::{SESSION_DURATION, SESSION_UPDATE_AGE},
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a renewed session lasts.
    pub session_duration: Duration,
    /// How old a session must be before it is renewed.
    pub session_update_age: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: SESSION_DURATION,
            session_update_age: SESSION_UPDATE_AGE,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Checks for a valid session cookie.
///
/// The user ID is placed into the request and the request executed normally
/// if the session is valid, otherwise the response from `reject` is returned
/// and the handler never runs. `reject` receives the sign-in URL that leads
/// back to the requested page.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    reject: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        tracing::debug!("No redirect target for {}. Falling back to dashboard.", request.uri().path());

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Rejecting request.");
            return reject(&log_in_redirect_url);
        }
    };
    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(error) => {
            tracing::debug!("Rejecting request to {}: {error}", parts.uri.path());
            return reject(&log_in_redirect_url);
        }
    };

    parts.extensions.insert(token.user_id);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let renewed_jar = match renew_auth_cookie_if_due(
        jar,
        &token,
        state.session_duration,
        state.session_update_age,
    ) {
        Ok(Some(renewed_jar)) => renewed_jar,
        Ok(None) => return response,
        Err(err) => {
            tracing::error!("Error renewing session: {err}. Keeping the current cookie.");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();
    for (key, val) in renewed_jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware for pages. Redirects to the sign-in page if there is no valid session.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware for htmx form endpoints. Responds with a HTMX redirect to the
/// sign-in page if there is no valid session.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

/// Middleware for the JSON API. Responds with `401 {"error": "No autenticado"}`
/// if there is no valid session.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard_api(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |_| {
        Error::Unauthenticated.into_json_response()
    })
    .await
}
