// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tf_clubs::error::{AppError, CATALOG_UNAVAILABLE_MESSAGE, SAVE_FAVORITE_ALERT};

#[test]
fn test_user_alerts() {
    assert_eq!(
        AppError::FavoritesWrite("boom".to_string()).user_alert(),
        Some(SAVE_FAVORITE_ALERT)
    );
    assert_eq!(
        AppError::CatalogUnavailable("boom".to_string()).user_alert(),
        Some(CATALOG_UNAVAILABLE_MESSAGE)
    );
    assert_eq!(AppError::FavoritesRead("boom".to_string()).user_alert(), None);
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (
            AppError::CatalogUnavailable("x".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::FavoritesWrite("x".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::Storage("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}
