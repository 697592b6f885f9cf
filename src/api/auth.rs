use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;

use crate::config::Credentials;
use super::errors::ApiError;

/// Proof that the request carried the configured basic-auth pair. Taking
/// this as a handler argument rejects the request with 403 before the
/// handler body runs.
#[derive(Debug)]
pub struct Authenticated;

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, ApiError> {
    let Some(expected) = req.app_data::<web::Data<Credentials>>() else {
        tracing::error!("No credentials registered with the app; refusing request");
        return Err(ApiError::Forbidden);
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic);

    match presented {
        Some(credentials) if credentials_match(&credentials, expected.get_ref()) => Ok(Authenticated),
        Some(credentials) => {
            tracing::warn!(username = %credentials.username, path = %req.path(), "Rejected credentials");
            Err(ApiError::Forbidden)
        }
        None => {
            tracing::warn!(path = %req.path(), "Missing or malformed Authorization header");
            Err(ApiError::Forbidden)
        }
    }
}

/// Compares both halves in constant time.
fn credentials_match(presented: &Credentials, expected: &Credentials) -> bool {
    let username = presented.username.as_bytes().ct_eq(expected.username.as_bytes());
    let password = presented.password.as_bytes().ct_eq(expected.password.as_bytes());
    bool::from(username & password)
}

/// Decode `Basic base64(user:password)`.
fn parse_basic(header_value: &str) -> Option<Credentials> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
