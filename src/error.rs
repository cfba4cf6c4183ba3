// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The club list could not be loaded for this view.
    #[error("Club list unavailable: {0}")]
    CatalogUnavailable(String),

    /// Reading the remote favorites document failed.
    #[error("Favorites read failed: {0}")]
    FavoritesRead(String),

    /// Writing the remote favorites document failed.
    #[error("Favorites write failed: {0}")]
    FavoritesWrite(String),

    /// Local device storage failed.
    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message shown to the user in a blocking alert, for the failures that
    /// must not stay silent.
    pub fn user_alert(&self) -> Option<&'static str> {
        match self {
            AppError::FavoritesWrite(_) => Some(SAVE_FAVORITE_ALERT),
            AppError::CatalogUnavailable(_) => Some(CATALOG_UNAVAILABLE_MESSAGE),
            _ => None,
        }
    }
}

/// Alert shown when a favorite toggle could not be saved.
pub const SAVE_FAVORITE_ALERT: &str = "Error saving favorite. Please try again.";

/// Alert shown when removing a favorite from the favorites view failed.
pub const REMOVE_FAVORITE_ALERT: &str = "Error removing favorite. Please try again.";

/// Inline message rendered in place of the club list.
pub const CATALOG_UNAVAILABLE_MESSAGE: &str = "Failed to load clubs. Please try again later.";

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::CatalogUnavailable(msg) => {
                tracing::error!(error = %msg, "Club list unavailable");
                (
                    StatusCode::BAD_GATEWAY,
                    "catalog_unavailable",
                    Some(CATALOG_UNAVAILABLE_MESSAGE.to_string()),
                )
            }
            AppError::FavoritesRead(msg) => {
                tracing::warn!(error = %msg, "Favorites read failed");
                (StatusCode::BAD_GATEWAY, "favorites_read_failed", None)
            }
            AppError::FavoritesWrite(msg) => {
                tracing::error!(error = %msg, "Favorites write failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "favorites_write_failed",
                    Some(SAVE_FAVORITE_ALERT.to_string()),
                )
            }
            AppError::Storage(msg) => {
                tracing::warn!(error = %msg, "Local storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
