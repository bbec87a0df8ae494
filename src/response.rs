//! HTTP response builders.
//!
//! Provides convenient functions for building JSON responses.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::outcome::Outcome;

/// Response body type used throughout warden.
pub type Body = Full<Bytes>;

/// Full response type used throughout warden.
pub type HttpResponse = Response<Body>;

/// Build a JSON response with the given status code and body.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> crate::Result<HttpResponse> {
    let json = serde_json::to_string(body)?;
    Ok(build(status, Bytes::from(json)))
}

/// Build a JSON response from an already-built value. Cannot fail.
pub fn json_value(status: StatusCode, body: &serde_json::Value) -> HttpResponse {
    build(status, Bytes::from(body.to_string()))
}

fn build(status: StatusCode, body: Bytes) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

/// Shape a resolution outcome for an access-check endpoint.
///
/// Granted is a 200 carrying the role; denials go through the error mapping.
pub fn access(outcome: Outcome) -> HttpResponse {
    match outcome.into_result() {
        Ok(role) => json_value(StatusCode::OK, &serde_json::json!({ "role": role.as_str() })),
        Err(e) => e.into_response(),
    }
}
