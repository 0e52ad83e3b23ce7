//! Defines functions for storing the session token in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::token::Token, user::UserID};

/// The name of the cookie holding the session token.
pub const COOKIE_TOKEN: &str = "session";

/// Build a cookie that is only sent over HTTPS, is hidden from scripts and is
/// valid for the whole site.
///
/// `SameSite::Lax` lets the cookie through on the top-level redirect back
/// from the identity provider.
pub(crate) fn secure_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build()
}

fn token_cookie(token: &Token) -> Result<Cookie<'static>, Error> {
    let token_string = serde_json::to_string(token)
        .map_err(|error| Error::TokenSerialization(error.to_string()))?;

    let mut cookie = secure_cookie(COOKIE_TOKEN, token_string);
    cookie.set_expires(token.expires_at);

    Ok(cookie)
}

/// Add a session cookie for `user_id` to the cookie jar that expires
/// `duration` from now.
///
/// # Errors
///
/// Returns [Error::TokenSerialization] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = Token::new(user_id, OffsetDateTime::now_utc(), duration);

    Ok(jar.add(token_cookie(&token)?))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = secure_cookie(COOKIE_TOKEN, "deleted".to_owned());
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

/// Read the session token from the cookie jar.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no session cookie,
/// - [Error::InvalidToken] if the cookie does not hold a token,
/// - [Error::SessionExpired] if the token has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::InvalidToken)?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::SessionExpired);
    }

    Ok(token)
}

/// Issue a fresh token lasting `duration` if `token` is at least
/// `update_age` old.
///
/// Returns `None` if the session does not need renewing yet.
///
/// # Errors
///
/// Returns [Error::TokenSerialization] if the new token cannot be serialized.
pub(crate) fn renew_auth_cookie_if_due(
    jar: PrivateCookieJar,
    token: &Token,
    duration: Duration,
    update_age: Duration,
) -> Result<Option<PrivateCookieJar>, Error> {
    let now = OffsetDateTime::now_utc();

    if !token.is_due_for_renewal(now, update_age) {
        return Ok(None);
    }

    let renewed = Token::new(token.user_id, now, duration);

    Ok(Some(jar.add(token_cookie(&renewed)?)))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::token::Token,
        config::{SESSION_DURATION, SESSION_UPDATE_AGE},
        user::UserID,
    };

    use super::{
        COOKIE_TOKEN, get_token_from_cookies, invalidate_auth_cookie, renew_auth_cookie_if_due,
        set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn jar_with_token(token: &Token) -> PrivateCookieJar {
        get_jar().add(Cookie::new(
            COOKIE_TOKEN,
            serde_json::to_string(token).unwrap(),
        ))
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let user_id = UserID::new(1);

        let jar = set_auth_cookie(get_jar(), user_id, SESSION_DURATION).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.user_id, user_id);
        assert_date_time_close!(token.expires_at, OffsetDateTime::now_utc() + SESSION_DURATION);

        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_date_time_close!(cookie.expires_datetime().unwrap(), token.expires_at);
    }

    #[test]
    fn missing_cookie_is_an_error() {
        assert_eq!(get_token_from_cookies(&get_jar()), Err(Error::CookieMissing));
    }

    #[test]
    fn garbage_cookie_is_an_invalid_token() {
        let jar = get_jar().add(Cookie::new(COOKIE_TOKEN, "FOOBAR"));

        assert_eq!(get_token_from_cookies(&jar), Err(Error::InvalidToken));
    }

    #[test]
    fn expired_token_is_an_error() {
        let issued_at = OffsetDateTime::now_utc() - Duration::days(8);
        let jar = jar_with_token(&Token::new(UserID::new(1), issued_at, SESSION_DURATION));

        assert_eq!(get_token_from_cookies(&jar), Err(Error::SessionExpired));
    }

    #[test]
    fn fresh_token_is_not_renewed() {
        let token = Token::new(UserID::new(1), OffsetDateTime::now_utc(), SESSION_DURATION);
        let jar = jar_with_token(&token);

        let renewed =
            renew_auth_cookie_if_due(jar, &token, SESSION_DURATION, SESSION_UPDATE_AGE).unwrap();

        assert!(renewed.is_none());
    }

    #[test]
    fn old_token_is_renewed() {
        let issued_at = OffsetDateTime::now_utc() - Duration::days(2);
        let token = Token::new(UserID::new(1), issued_at, SESSION_DURATION);
        let jar = jar_with_token(&token);

        let jar = renew_auth_cookie_if_due(jar, &token, SESSION_DURATION, SESSION_UPDATE_AGE)
            .unwrap()
            .expect("token should be renewed");

        let renewed = get_token_from_cookies(&jar).unwrap();
        assert_eq!(renewed.user_id, token.user_id);
        assert_date_time_close!(renewed.issued_at, OffsetDateTime::now_utc());
        assert_date_time_close!(
            renewed.expires_at,
            OffsetDateTime::now_utc() + SESSION_DURATION
        );
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), SESSION_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(get_token_from_cookies(&jar), Err(Error::InvalidToken));
    }
}
