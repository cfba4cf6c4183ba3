// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper for per-user favorites documents.
//!
//! Each authenticated user owns `users/{user_id}`, whose `favorites` field is
//! an array of favorite snapshots. Writes touch only that field.

use crate::db::{collections, FavoritesDocumentStore};
use crate::error::AppError;
use crate::models::{FavoriteRecord, FavoritesDocument, UserId};
use async_trait::async_trait;
use firestore::paths;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator rejects real credentials, so skip credential discovery.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Read-modify-write the user's favorites array, committing the write
    /// through a transaction.
    async fn update_favorites_atomic<F>(&self, user: &UserId, apply: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Vec<FavoriteRecord>) + Send,
    {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<FavoritesDocument> = client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user.as_str())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read favorites in transaction: {}", e))
            })?;

        let mut document = current.unwrap_or_default();
        apply(&mut document.favorites);

        client
            .fluent()
            .update()
            .fields(paths!(FavoritesDocument::{favorites}))
            .in_col(collections::USERS)
            .document_id(user.as_str())
            .object(&document)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add favorites to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl FavoritesDocumentStore for FirestoreDb {
    async fn get_favorites(&self, user: &UserId) -> Result<Option<Vec<FavoriteRecord>>, AppError> {
        let document: Option<FavoritesDocument> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user.as_str())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(document.map(|d| d.favorites))
    }

    async fn merge_favorites(
        &self,
        user: &UserId,
        favorites: &[FavoriteRecord],
    ) -> Result<(), AppError> {
        let document = FavoritesDocument {
            favorites: favorites.to_vec(),
        };

        // The field mask keeps any other fields of the user document intact.
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths!(FavoritesDocument::{favorites}))
            .in_col(collections::USERS)
            .document_id(user.as_str())
            .object(&document)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(user = %user, count = favorites.len(), "Merged favorites field");
        Ok(())
    }

    async fn array_union(
        &self,
        user: &UserId,
        records: &[FavoriteRecord],
    ) -> Result<(), AppError> {
        self.update_favorites_atomic(user, |favorites| {
            for record in records {
                if !favorites.contains(record) {
                    favorites.push(record.clone());
                }
            }
        })
        .await?;

        tracing::debug!(user = %user, count = records.len(), "Array union on favorites");
        Ok(())
    }

    async fn array_remove(
        &self,
        user: &UserId,
        records: &[FavoriteRecord],
    ) -> Result<(), AppError> {
        self.update_favorites_atomic(user, |favorites| {
            favorites.retain(|existing| !records.contains(existing));
        })
        .await?;

        tracing::debug!(user = %user, count = records.len(), "Array remove on favorites");
        Ok(())
    }
}
