// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token authentication.
//!
//! Signing in happens elsewhere; this layer only turns a presented token into
//! the current user identifier. Requests without a valid token are anonymous.

use crate::models::UserId;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "tfclubs_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authentication state of a request.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<UserId>);

/// Decode a session token into a user identifier.
pub fn verify_token(token: &str, signing_key: &[u8]) -> Option<UserId> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) if !data.claims.sub.is_empty() => Some(UserId::new(data.claims.sub)),
        Ok(_) => {
            tracing::warn!("Session token has empty subject");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring invalid session token");
            None
        }
    }
}

/// Middleware that records the request's user, if any, as `CurrentUser`.
pub async fn identify_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    // Try cookie first, then header
    let token = match jar.get(TOKEN_COOKIE) {
        Some(cookie) => Some(cookie.value().to_string()),
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string),
    };

    let user = token.and_then(|t| verify_token(&t, &state.config.jwt_signing_key));
    request.extensions_mut().insert(CurrentUser(user));

    next.run(request).await
}

/// Create a session token for a user (used by tests and local tooling).
pub fn create_jwt(user: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user.to_string(),
        iat: now,
        exp: now + 30 * 24 * 60 * 60, // 30 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";

    #[test]
    fn test_token_roundtrip() {
        let token = create_jwt("user-42", KEY).unwrap();
        assert_eq!(verify_token(&token, KEY), Some(UserId::new("user-42")));
    }

    #[test]
    fn test_wrong_key_is_anonymous() {
        let token = create_jwt("user-42", KEY).unwrap();
        assert_eq!(verify_token(&token, b"some_other_key_of_enough_length"), None);
        assert_eq!(verify_token("garbage", KEY), None);
    }
}
