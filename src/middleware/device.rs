// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device identity cookie.
//!
//! Local favorites and filter state belong to a device, not a user. The
//! device is identified by a random cookie issued on first visit.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ring::rand::{SecureRandom, SystemRandom};

/// Cookie carrying the device identifier.
pub const DEVICE_COOKIE: &str = "tfclubs_device";

const DEVICE_ID_BYTES: usize = 16;

/// Device identifier of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(pub String);

/// Generate a new random device identifier.
pub fn new_device_id() -> Option<String> {
    let mut bytes = [0u8; DEVICE_ID_BYTES];
    SystemRandom::new().fill(&mut bytes).ok()?;
    Some(hex::encode(bytes))
}

fn is_valid_device_id(id: &str) -> bool {
    id.len() == DEVICE_ID_BYTES * 2 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Middleware that attaches a `DeviceId`, issuing the cookie when missing.
pub async fn ensure_device(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let existing = jar
        .get(DEVICE_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|id| is_valid_device_id(id));

    let (device_id, issued) = match existing {
        Some(id) => (id, false),
        None => match new_device_id() {
            Some(id) => (id, true),
            None => {
                tracing::error!("Failed to generate device identifier");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        },
    };

    request
        .extensions_mut()
        .insert(DeviceId(device_id.clone()));
    let response = next.run(request).await;

    if !issued {
        return response;
    }

    let cookie = Cookie::build((DEVICE_COOKIE, device_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .permanent()
        .build();
    (jar.add(cookie), response).into_response()
}
