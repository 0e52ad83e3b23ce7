//! Route handlers for signing in with an OAuth identity provider.
//!
//! `GET /auth/github` remembers a random `state` and where to go afterwards in
//! a short-lived private cookie, then sends the user to the provider. The
//! provider redirects back to `GET /auth/callback`, which checks the `state`,
//! exchanges the code for the user's identity and starts a session.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        IdentityProvider,
        cookie::{secure_cookie, set_auth_cookie},
        log_in::{SignInError, parse_redirect_url},
    },
    config::{DEFAULT_NEW_USER_ROLE, SESSION_DURATION},
    endpoints,
    user::find_or_create_user,
};

/// The name of the cookie holding the pending sign-in.
pub(crate) const COOKIE_OAUTH_STATE: &str = "oauth_state";

/// How long the user has to authorize the app with the provider.
const OAUTH_STATE_MAX_AGE: Duration = Duration::minutes(10);

const STATE_LENGTH: usize = 32;

/// The state needed to sign users in with an identity provider.
#[derive(Clone)]
pub struct OAuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for finding or creating the signed-in user.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Who vouches for the user's identity.
    pub identity_provider: Arc<dyn IdentityProvider>,
}

impl FromRef<AppState> for OAuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
            identity_provider: state.identity_provider.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<OAuthState> for Key {
    fn from_ref(state: &OAuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// A sign-in that has been sent to the provider but not yet completed.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct PendingSignIn {
    state: String,
    redirect_url: Option<String>,
}

/// The query parameters for starting a sign-in.
#[derive(Debug, Deserialize)]
pub struct StartSignInQuery {
    /// Where to send the user once they have signed in.
    pub redirect_url: Option<String>,
}

/// The query parameters the provider adds when redirecting back.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// The authorization code to exchange for the user's identity.
    pub code: Option<String>,
    /// The `state` given to the provider when the sign-in started.
    pub state: Option<String>,
    /// Set instead of `code` when the provider did not authorize the user,
    /// e.g. "access_denied".
    pub error: Option<String>,
}

fn generate_state() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

fn pending_sign_in_cookie(pending: &PendingSignIn) -> Result<Cookie<'static>, serde_json::Error> {
    let mut cookie = secure_cookie(COOKIE_OAUTH_STATE, serde_json::to_string(pending)?);
    cookie.set_max_age(OAUTH_STATE_MAX_AGE);

    Ok(cookie)
}

fn take_pending_sign_in(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<PendingSignIn>) {
    let pending = jar
        .get(COOKIE_OAUTH_STATE)
        .and_then(|cookie| serde_json::from_str(cookie.value_trimmed()).ok());
    let jar = jar.remove(Cookie::build(COOKIE_OAUTH_STATE).path("/"));

    (jar, pending)
}

/// Start signing in with the identity provider.
pub async fn start_github_auth(
    State(state): State<OAuthState>,
    jar: PrivateCookieJar,
    Query(query): Query<StartSignInQuery>,
) -> Response {
    let pending = PendingSignIn {
        state: generate_state(),
        redirect_url: parse_redirect_url(query.redirect_url.as_deref(), "sign-in start"),
    };

    let cookie = match pending_sign_in_cookie(&pending) {
        Ok(cookie) => cookie,
        Err(error) => {
            tracing::error!("Could not serialize the pending sign-in: {error}");
            return Redirect::to(&SignInError::Internal.log_in_url()).into_response();
        }
    };

    let authorization_url = state.identity_provider.authorization_url(&pending.state);

    (jar.add(cookie), Redirect::to(&authorization_url)).into_response()
}

/// Complete the sign-in started by [start_github_auth].
///
/// On success the user is found by email or created with
/// [DEFAULT_NEW_USER_ROLE], a session is started and the user is redirected
/// to the page they originally asked for, or the dashboard. On failure the
/// user is redirected to the sign-in page with an error message.
pub async fn oauth_callback(
    State(state): State<OAuthState>,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let (jar, pending) = take_pending_sign_in(jar);

    match complete_sign_in(&state, jar.clone(), pending, query).await {
        Ok((jar, redirect_url)) => (jar, Redirect::to(&redirect_url)).into_response(),
        Err(error) => (jar, Redirect::to(&error.log_in_url())).into_response(),
    }
}

async fn complete_sign_in(
    state: &OAuthState,
    jar: PrivateCookieJar,
    pending: Option<PendingSignIn>,
    query: CallbackQuery,
) -> Result<(PrivateCookieJar, String), SignInError> {
    if let Some(error) = query.error {
        tracing::info!("Identity provider did not authorize the user: {error}");
        return Err(match error.as_str() {
            "access_denied" => SignInError::AccessDenied,
            _ => SignInError::ProviderFailed,
        });
    }

    let pending = pending.ok_or_else(|| {
        tracing::warn!("OAuth callback without a pending sign-in.");
        SignInError::StateMismatch
    })?;

    if query.state.as_deref() != Some(pending.state.as_str()) {
        tracing::warn!("{}", Error::OAuthStateMismatch);
        return Err(SignInError::StateMismatch);
    }

    let code = query.code.ok_or_else(|| {
        tracing::warn!("OAuth callback without an authorization code.");
        SignInError::ProviderFailed
    })?;

    let identity = state
        .identity_provider
        .exchange_code(&code)
        .await
        .map_err(|error| {
            tracing::error!("Sign-in failed: {error}");
            SignInError::ProviderFailed
        })?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| SignInError::Internal)?;

        find_or_create_user(&identity, DEFAULT_NEW_USER_ROLE, &connection).map_err(|error| {
            tracing::error!("Could not find or create user {}: {error}", identity.email);
            SignInError::Internal
        })?
    };

    let jar = set_auth_cookie(jar, user.id, SESSION_DURATION).map_err(|error| {
        tracing::error!("Could not set session cookie for user {}: {error}", user.id);
        SignInError::Internal
    })?;

    tracing::info!("User {} signed in.", user.id);

    let redirect_url = pending
        .redirect_url
        .as_deref()
        .and_then(crate::auth::redirect::normalize_redirect_url)
        .unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    Ok((jar, redirect_url))
}
