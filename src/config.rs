// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where remote favorites documents live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStoreKind {
    /// Cloud Firestore (or the emulator when FIRESTORE_EMULATOR_HOST is set).
    Firestore,
    /// Process-local documents; lost on restart.
    Memory,
}

impl FromStr for RemoteStoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(RemoteStoreKind::Firestore),
            "memory" => Ok(RemoteStoreKind::Memory),
            _ => Err(ConfigError::Invalid("REMOTE_STORE", s.to_string())),
        }
    }
}

/// How remote adds and removals recognise an existing favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoriteMatch {
    /// Same `club` key.
    #[default]
    Key,
    /// Whole-record equality via the document store's array primitives.
    /// A removal silently does nothing if any cached field has drifted.
    Structural,
}

impl FromStr for FavoriteMatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "key" => Ok(FavoriteMatch::Key),
            "structural" => Ok(FavoriteMatch::Structural),
            _ => Err(ConfigError::Invalid("FAVORITES_MATCH", s.to_string())),
        }
    }
}

/// Where the published club list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClubListSource {
    Url(String),
    File(PathBuf),
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Remote favorites backend
    pub remote_store: RemoteStoreKind,
    /// Published club list
    pub club_source: ClubListSource,
    /// Directory for per-device storage files (in memory when unset)
    pub local_storage_dir: Option<PathBuf>,
    /// Remote add/remove matching policy
    pub favorite_match: FavoriteMatch,
    /// Device sessions unused for this long are dropped
    pub session_idle: Duration,
    /// Session token verification key (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            remote_store: RemoteStoreKind::Memory,
            club_source: ClubListSource::File(PathBuf::from("data/clubs.json")),
            local_storage_dir: None,
            favorite_match: FavoriteMatch::Key,
            session_idle: Duration::from_secs(1800),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let club_source = match env::var("CLUBS_URL") {
            Ok(url) if !url.trim().is_empty() => ClubListSource::Url(url.trim().to_string()),
            _ => ClubListSource::File(
                env::var("CLUBS_PATH")
                    .unwrap_or_else(|_| "data/clubs.json".to_string())
                    .into(),
            ),
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            remote_store: env::var("REMOTE_STORE")
                .map(|v| v.parse())
                .unwrap_or(Ok(RemoteStoreKind::Firestore))?,
            club_source,
            local_storage_dir: env::var("LOCAL_STORAGE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            favorite_match: env::var("FAVORITES_MATCH")
                .map(|v| v.parse())
                .unwrap_or(Ok(FavoriteMatch::Key))?,
            session_idle: Duration::from_secs(
                env::var("SESSION_IDLE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1800),
            ),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("REMOTE_STORE", "memory");
        env::set_var("FAVORITES_MATCH", "structural");
        env::set_var("CLUBS_URL", "https://example.org/clubs.json");
        env::set_var("SESSION_IDLE_SECS", "600");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.remote_store, RemoteStoreKind::Memory);
        assert_eq!(config.favorite_match, FavoriteMatch::Structural);
        assert_eq!(
            config.club_source,
            ClubListSource::Url("https://example.org/clubs.json".to_string())
        );
        assert_eq!(config.session_idle, Duration::from_secs(600));
        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Key".parse::<FavoriteMatch>().unwrap(), FavoriteMatch::Key);
        assert!("fuzzy".parse::<FavoriteMatch>().is_err());
        assert_eq!(
            " FIRESTORE ".parse::<RemoteStoreKind>().unwrap(),
            RemoteStoreKind::Firestore
        );
        assert!(matches!(
            "redis".parse::<RemoteStoreKind>(),
            Err(ConfigError::Invalid("REMOTE_STORE", _))
        ));
    }
}
