// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token tests.
//!
//! These tests verify that tokens minted by `create_jwt` carry the claims the
//! middleware expects, catching compatibility issues early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tf_clubs::middleware::auth::{create_jwt, verify_token, Claims};
use tf_clubs::models::UserId;

const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

#[test]
fn test_jwt_claims_shape() {
    let token = create_jwt("user-123", KEY).unwrap();

    let key = DecodingKey::from_secret(KEY);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, "user-123");
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_verify_token() {
    let token = create_jwt("user-123", KEY).unwrap();
    assert_eq!(verify_token(&token, KEY), Some(UserId::new("user-123")));
}

#[test]
fn test_expired_token_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: "user-123".to_string(),
        iat: 1_000_000,
        exp: 1_000_100,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    assert_eq!(verify_token(&token, KEY), None);
}

#[test]
fn test_empty_subject_rejected() {
    let token = create_jwt("", KEY).unwrap();
    assert_eq!(verify_token(&token, KEY), None);
}
