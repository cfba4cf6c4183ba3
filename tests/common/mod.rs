// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use std::sync::Arc;
use tf_clubs::config::Config;
use tf_clubs::db::{FirestoreDb, MemoryDocumentStore};
use tf_clubs::middleware::auth::create_jwt;
use tf_clubs::models::{ClubRecord, ClubType, MeetingDay, MeetingTime};
use tf_clubs::routes::create_router;
use tf_clubs::services::{
    ClubSource, FavoritesReconciler, RemoteFavoritesStore, SessionRegistry, StaticClubSource,
};
use tf_clubs::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A club with every field filled in.
#[allow(dead_code)]
pub fn club(name: &str, club_type: ClubType, time: MeetingTime, day: MeetingDay) -> ClubRecord {
    ClubRecord {
        club: name.to_string(),
        staff: Some(format!("Advisor of {}", name)),
        email: Some(format!("{}@school.example", name.to_lowercase().replace(' ', "."))),
        club_type: Some(club_type),
        time: Some(time),
        day: Some(day),
        description: Some(format!("All about {}.", name)),
    }
}

/// The club list served by test apps.
#[allow(dead_code)]
pub fn sample_clubs() -> Vec<ClubRecord> {
    vec![
        club("Robotics", ClubType::Academic, MeetingTime::After, MeetingDay::Tuesday),
        club("Chess", ClubType::Games, MeetingTime::After, MeetingDay::Monday),
        club("Soccer", ClubType::Sports, MeetingTime::After, MeetingDay::Friday),
        club("3D Printing", ClubType::Academic, MeetingTime::Before, MeetingDay::Thursday),
        club("Key Club", ClubType::Service, MeetingTime::Before, MeetingDay::Monday),
    ]
}

/// Handles a test needs besides the router.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub documents: Arc<MemoryDocumentStore>,
}

/// Create a test app backed by in-memory documents and the sample clubs.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_source(Arc::new(StaticClubSource::new(sample_clubs())))
}

/// Create a test app with a specific club list source.
#[allow(dead_code)]
pub fn create_test_app_with_source(club_source: Arc<dyn ClubSource>) -> TestApp {
    let config = Config::test_default();
    let documents = Arc::new(MemoryDocumentStore::new());
    let remote = RemoteFavoritesStore::new(documents.clone(), config.favorite_match);

    let state = Arc::new(AppState {
        config,
        reconciler: FavoritesReconciler::new(remote),
        club_source,
        sessions: SessionRegistry::new(None),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        documents,
    }
}

/// Device identifier used by requests that should share a session.
#[allow(dead_code)]
pub const TEST_DEVICE: &str = "0123456789abcdef0123456789abcdef";

/// Create a session token for a user.
#[allow(dead_code)]
pub fn create_test_jwt(user: &str, signing_key: &[u8]) -> String {
    create_jwt(user, signing_key).expect("Failed to create JWT")
}

/// Build a request from the test device, optionally signed in.
#[allow(dead_code)]
pub fn device_request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut cookie = format!("tfclubs_device={}", TEST_DEVICE);
    if let Some(token) = token {
        cookie.push_str(&format!("; tfclubs_token={}", token));
    }

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text.
#[allow(dead_code)]
pub async fn text_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
