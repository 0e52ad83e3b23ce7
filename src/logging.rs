//! Middleware for logging requests and responses.
//!
//! OAuth codes, OAuth states and cookies are redacted before anything is logged.

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderMap, HeaderValue, StatusCode, Uri,
        header::{COOKIE, LOCATION, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::internal_server_error::InternalServerError;

/// The maximum number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// Query parameters that must never appear in the logs.
const SECRET_QUERY_PARAMS: [&str; 2] = ["code", "state"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body for {}: {error}", parts.uri.path());
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    log_request(
        &parts.method,
        &parts.uri,
        &parts.headers,
        &String::from_utf8_lossy(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return InternalServerError::default().into_response();
        }
    };

    log_response(
        parts.status,
        &parts.headers,
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Replace the values of [SECRET_QUERY_PARAMS] in a query string.
fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| {
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);

            if SECRET_QUERY_PARAMS.contains(&key) {
                format!("{key}={REDACTED}")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The URL with the values of [SECRET_QUERY_PARAMS] replaced.
fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((path, query)) => format!("{path}?{}", redact_query(query)),
        None => url.to_owned(),
    }
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    for name in [COOKIE, SET_COOKIE] {
        if headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(REDACTED));
        }
    }

    let location = headers
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(redact_url)
        .and_then(|location| HeaderValue::from_str(&location).ok());
    if let Some(location) = location {
        headers.insert(LOCATION, location);
    }

    headers
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if the
/// body is short enough to be logged in full.
fn truncate_body(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(index, _)| &body[..index])
}

fn log_request(method: &axum::http::Method, uri: &Uri, headers: &HeaderMap, body: &str) {
    let url = redact_url(&uri.to_string());
    let headers = redact_headers(headers);

    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Received request: {method} {url}\nheaders: {headers:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => {
            tracing::info!("Received request: {method} {url}\nheaders: {headers:#?}\nbody: {body:?}");
        }
    }
}

fn log_response(status: StatusCode, headers: &HeaderMap, body: &str) {
    let headers = redact_headers(headers);

    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {status}\nheaders: {headers:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => {
            tracing::info!("Sending response: {status}\nheaders: {headers:#?}\nbody: {body:?}");
        }
    }
}
