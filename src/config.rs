//! Sign-in policy and identity provider settings.

use time::Duration;

use crate::user::Role;

/// The role given to a user the first time they sign in.
pub const DEFAULT_NEW_USER_ROLE: Role = Role::Admin;

/// How long a session lasts without any activity.
pub const SESSION_DURATION: Duration = Duration::days(7);

/// How old a session must be before a request renews it.
///
/// Renewing at most once per day avoids setting a new cookie on every request.
pub const SESSION_UPDATE_AGE: Duration = Duration::days(1);

/// The base URL of GitHub's OAuth endpoints.
pub const GITHUB_OAUTH_URL: &str = "https://github.com/login/oauth";

/// The base URL of GitHub's REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// The credentials and URLs for an OAuth identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthConfig {
    /// The client ID issued by the identity provider.
    pub client_id: String,
    /// The client secret issued by the identity provider.
    pub client_secret: String,
    /// The public URL of this server, e.g. "https://localhost:3000".
    ///
    /// The callback URL given to the provider is built from this.
    pub public_url: String,
    /// The base URL of the provider's OAuth endpoints.
    pub oauth_url: String,
    /// The base URL of the provider's user API.
    pub api_url: String,
}

impl OAuthConfig {
    /// Settings for signing in with GitHub.
    pub fn github(client_id: &str, client_secret: &str, public_url: &str) -> Self {
        Self {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            public_url: public_url.trim_end_matches('/').to_owned(),
            oauth_url: GITHUB_OAUTH_URL.to_owned(),
            api_url: GITHUB_API_URL.to_owned(),
        }
    }

    /// The URL the provider should redirect to after the user authorizes the app.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.public_url, crate::endpoints::OAUTH_CALLBACK)
    }
}
