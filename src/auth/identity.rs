//! Identity providers that vouch for who a user is.
//!
//! The provider only handles transport: building the authorization URL,
//! exchanging the authorization code and decoding the user's profile.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;

use crate::{Error, config::OAuthConfig};

const USER_AGENT: &str = "cashbook";
const GITHUB_SCOPES: &str = "read:user user:email";

/// Who signed in, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// The display name.
    pub name: String,
    /// The email address. Users are matched on this across sign-ins.
    pub email: String,
}

/// An OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The URL to send the user to so they can authorize the app.
    ///
    /// `state` is echoed back on the callback and must be verified there.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange the authorization code from the callback for the user's identity.
    ///
    /// # Errors
    ///
    /// Returns [Error::OAuthExchange] if the provider rejects the code or
    /// returns a response that cannot be decoded.
    async fn exchange_code(&self, code: &str) -> Result<Identity, Error>;
}

/// Signs users in with their GitHub account.
pub struct GitHubProvider {
    client: Client,
    config: OAuthConfig,
}

impl GitHubProvider {
    /// Build a provider using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: OAuthConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, config })
    }

    async fn request_access_token(&self, code: &str) -> Result<String, Error> {
        let response = self
            .client
            .post(format!("{}/access_token", self.config.oauth_url))
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.callback_url().as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::OAuthExchange(format!(
                "token endpoint returned status {status}"
            )));
        }

        let token: AccessTokenResponse = response.json().await.map_err(map_transport_error)?;

        match token {
            AccessTokenResponse {
                access_token: Some(access_token),
                ..
            } => Ok(access_token),
            AccessTokenResponse {
                error: Some(error),
                error_description,
                ..
            } => Err(Error::OAuthExchange(format!(
                "{error}: {}",
                error_description.unwrap_or_default()
            ))),
            _ => Err(Error::OAuthExchange(
                "token response had neither a token nor an error".to_owned(),
            )),
        }
    }

    async fn get_api<T>(&self, path: &str, access_token: &str) -> Result<T, Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(format!("{}{path}", self.config.api_url))
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::OAuthExchange(format!(
                "GET {path} returned status {status}"
            )));
        }

        response.json().await.map_err(map_transport_error)
    }
}

#[async_trait]
impl IdentityProvider for GitHubProvider {
    fn authorization_url(&self, state: &str) -> String {
        let callback_url = self.config.callback_url();
        let query = serde_urlencoded::to_string([
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", callback_url.as_str()),
            ("scope", GITHUB_SCOPES),
            ("state", state),
        ])
        .unwrap_or_default();

        format!("{}/authorize?{query}", self.config.oauth_url)
    }

    async fn exchange_code(&self, code: &str) -> Result<Identity, Error> {
        let access_token = self.request_access_token(code).await?;
        let profile: GitHubUser = self.get_api("/user", &access_token).await?;

        // Users with a private email address only expose it through /user/emails.
        let email = match profile.email.filter(|email| !email.trim().is_empty()) {
            Some(email) => email,
            None => {
                let emails: Vec<GitHubEmail> = self.get_api("/user/emails", &access_token).await?;
                primary_email(emails).ok_or_else(|| {
                    Error::OAuthExchange(format!("{} has no verified email", profile.login))
                })?
            }
        };

        let name = profile
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(profile.login);

        Ok(Identity { name, email })
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

fn primary_email(emails: Vec<GitHubEmail>) -> Option<String> {
    let mut verified = emails.into_iter().filter(|email| email.verified);
    let first = verified.next()?;

    if first.primary {
        return Some(first.email);
    }

    verified
        .find(|email| email.primary)
        .map(|email| email.email)
        .or(Some(first.email))
}

fn map_transport_error(error: reqwest::Error) -> Error {
    Error::OAuthExchange(error.to_string())
}

#[cfg(test)]
mod github_provider_tests {
    use std::{collections::HashMap, net::SocketAddr, time::Duration};

    use axum::{
        Form, Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use crate::{Error, config::OAuthConfig};

    use super::{GitHubEmail, GitHubProvider, Identity, IdentityProvider, primary_email};

    const GOOD_CODE: &str = "good-code";
    const ACCESS_TOKEN: &str = "gho_test";

    async fn access_token(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
        if form.get("code").map(String::as_str) == Some(GOOD_CODE) {
            Json(json!({"access_token": ACCESS_TOKEN, "token_type": "bearer"}))
        } else {
            Json(json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            }))
        }
    }

    fn is_authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some(format!("Bearer {ACCESS_TOKEN}").as_str())
    }

    async fn start_fake_github(user: Value) -> SocketAddr {
        let user_handler = move |headers: HeaderMap| {
            let user = user.clone();
            async move {
                if is_authorized(&headers) {
                    Json(user).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }
        };
        let emails_handler = |headers: HeaderMap| async move {
            if !is_authorized(&headers) {
                return StatusCode::UNAUTHORIZED.into_response();
            }

            Json(json!([
                {"email": "old@example.com", "primary": false, "verified": true},
                {"email": "ada@example.com", "primary": true, "verified": true}
            ]))
            .into_response()
        };

        let app = Router::new()
            .route("/login/oauth/access_token", post(access_token))
            .route("/api/user", get(user_handler))
            .route("/api/user/emails", get(emails_handler));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind fake GitHub server");
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        address
    }

    fn provider_for(address: SocketAddr) -> GitHubProvider {
        let config = OAuthConfig {
            oauth_url: format!("http://{address}/login/oauth"),
            api_url: format!("http://{address}/api"),
            ..OAuthConfig::github("client-id", "client-secret", "https://localhost:3000")
        };

        GitHubProvider::new(config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn authorization_url_includes_client_and_state() {
        let config = OAuthConfig::github("client-id", "client-secret", "https://localhost:3000/");
        let provider = GitHubProvider::new(config, Duration::from_secs(5)).unwrap();

        let url = provider.authorization_url("abc123");

        assert_eq!(
            url,
            "https://github.com/login/oauth/authorize?client_id=client-id\
            &redirect_uri=https%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback\
            &scope=read%3Auser+user%3Aemail&state=abc123"
        );
    }

    #[tokio::test]
    async fn exchange_code_returns_profile_identity() {
        let address = start_fake_github(json!({
            "login": "ada",
            "name": "Ada Lovelace",
            "email": "ada@example.com"
        }))
        .await;

        let identity = provider_for(address).exchange_code(GOOD_CODE).await;

        assert_eq!(
            identity,
            Ok(Identity {
                name: "Ada Lovelace".to_owned(),
                email: "ada@example.com".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn exchange_code_falls_back_to_login_and_primary_email() {
        let address = start_fake_github(json!({
            "login": "ada",
            "name": null,
            "email": null
        }))
        .await;

        let identity = provider_for(address).exchange_code(GOOD_CODE).await;

        assert_eq!(
            identity,
            Ok(Identity {
                name: "ada".to_owned(),
                email: "ada@example.com".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn exchange_code_rejects_bad_code() {
        let address = start_fake_github(json!({"login": "ada"})).await;

        let result = provider_for(address).exchange_code("bad-code").await;

        assert!(
            matches!(result, Err(Error::OAuthExchange(ref message)) if message.starts_with("bad_verification_code")),
            "got {result:?}"
        );
    }

    #[test]
    fn primary_email_ignores_unverified_addresses() {
        let emails = vec![
            GitHubEmail {
                email: "spam@example.com".to_owned(),
                primary: true,
                verified: false,
            },
            GitHubEmail {
                email: "ada@example.com".to_owned(),
                primary: false,
                verified: true,
            },
        ];

        assert_eq!(primary_email(emails), Some("ada@example.com".to_owned()));
        assert_eq!(primary_email(Vec::new()), None);
    }
}
