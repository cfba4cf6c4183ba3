// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Club list loading and ordering.

use crate::models::ClubRecord;
use async_trait::async_trait;
use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Errors from loading the club list.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to fetch club list: {0}")]
    Fetch(String),

    #[error("Club list request returned status {0}")]
    Status(u16),

    #[error("Failed to parse club list: {0}")]
    Parse(String),
}

/// External source of the published club list.
#[async_trait]
pub trait ClubSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ClubRecord>, CatalogError>;
}

/// Club list served over HTTP as a JSON array.
pub struct HttpClubSource {
    client: reqwest::Client,
    url: String,
}

impl HttpClubSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ClubSource for HttpClubSource {
    async fn fetch(&self) -> Result<Vec<ClubRecord>, CatalogError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// Club list read from a JSON file.
pub struct FileClubSource {
    path: PathBuf,
}

impl FileClubSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ClubSource for FileClubSource {
    async fn fetch(&self) -> Result<Vec<ClubRecord>, CatalogError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Fetch(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// Fixed club list, optionally failing every fetch.
#[derive(Default)]
pub struct StaticClubSource {
    clubs: Vec<ClubRecord>,
    fail: bool,
}

impl StaticClubSource {
    pub fn new(clubs: Vec<ClubRecord>) -> Self {
        Self { clubs, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            clubs: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl ClubSource for StaticClubSource {
    async fn fetch(&self) -> Result<Vec<ClubRecord>, CatalogError> {
        if self.fail {
            return Err(CatalogError::Status(503));
        }
        Ok(self.clubs.clone())
    }
}

/// The club list for one page view, in display order.
#[derive(Debug, Clone, Default)]
pub struct ClubCatalog {
    clubs: Vec<ClubRecord>,
}

impl ClubCatalog {
    /// Fetch the list once and sort it. No retry on failure.
    pub async fn load(source: &dyn ClubSource) -> Result<Self, CatalogError> {
        let clubs = source.fetch().await?;
        tracing::debug!(count = clubs.len(), "Loaded club list");
        Ok(Self::from_clubs(clubs))
    }

    pub fn from_clubs(mut clubs: Vec<ClubRecord>) -> Self {
        sort_clubs(&mut clubs);
        Self { clubs }
    }

    pub fn clubs(&self) -> &[ClubRecord] {
        &self.clubs
    }

    pub fn get(&self, club: &str) -> Option<&ClubRecord> {
        self.clubs.iter().find(|c| c.club == club)
    }

    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty()
    }
}

/// Names starting with a digit first, then case-insensitive collation.
/// The sort is stable.
pub fn sort_clubs(clubs: &mut [ClubRecord]) {
    let collator = NameCollator::new();
    clubs.sort_by(|a, b| {
        b.starts_with_digit()
            .cmp(&a.starts_with_digit())
            .then_with(|| collator.compare(&a.club.to_lowercase(), &b.club.to_lowercase()))
    });
}

/// Root-locale collator for club names.
pub struct NameCollator {
    collator: Option<Collator>,
}

impl NameCollator {
    pub fn new() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                tracing::warn!(error = %e, "Collator unavailable, ordering names by code point");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl Default for NameCollator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two names in root-locale order.
pub fn collate(a: &str, b: &str) -> Ordering {
    NameCollator::new().compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(catalog: &ClubCatalog) -> Vec<&str> {
        catalog.clubs().iter().map(|c| c.club.as_str()).collect()
    }

    #[test]
    fn test_digit_names_first() {
        let catalog = ClubCatalog::from_clubs(vec![
            ClubRecord::named("Art Club"),
            ClubRecord::named("4-H Club"),
            ClubRecord::named("Ski Club"),
        ]);
        assert_eq!(names(&catalog), vec!["4-H Club", "Art Club", "Ski Club"]);
    }

    #[test]
    fn test_case_insensitive_order() {
        let catalog = ClubCatalog::from_clubs(vec![
            ClubRecord::named("robotics"),
            ClubRecord::named("Anime Club"),
            ClubRecord::named("chess"),
            ClubRecord::named("Best Buddies"),
        ]);
        assert_eq!(
            names(&catalog),
            vec!["Anime Club", "Best Buddies", "chess", "robotics"]
        );
    }

    #[test]
    fn test_digit_partition_sorted_within() {
        let catalog = ClubCatalog::from_clubs(vec![
            ClubRecord::named("3D Printing"),
            ClubRecord::named("Zoology"),
            ClubRecord::named("1st Robotics"),
        ]);
        assert_eq!(names(&catalog), vec!["1st Robotics", "3D Printing", "Zoology"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_names() {
        let mut first = ClubRecord::named("Chess");
        first.staff = Some("first".to_string());
        let mut second = ClubRecord::named("chess");
        second.staff = Some("second".to_string());

        let catalog = ClubCatalog::from_clubs(vec![first, second]);
        let staff: Vec<_> = catalog
            .clubs()
            .iter()
            .map(|c| c.staff.as_deref().unwrap())
            .collect();
        assert_eq!(staff, vec!["first", "second"]);
    }

    #[test]
    fn test_collate_punctuation_before_letters() {
        assert_eq!(collate("a-b", "ab"), Ordering::Less);
        assert_eq!(collate("a b", "a-b"), Ordering::Less);
        assert_eq!(collate("a~", "a1"), Ordering::Less);
        assert_eq!(collate("ski", "ski club"), Ordering::Less);
    }

    #[test]
    fn test_accented_names_sort_with_their_base_letter() {
        let catalog = ClubCatalog::from_clubs(vec![
            ClubRecord::named("Film Club"),
            ClubRecord::named("École Club"),
            ClubRecord::named("Zoo Club"),
            ClubRecord::named("Debate"),
        ]);
        assert_eq!(
            names(&catalog),
            vec!["Debate", "École Club", "Film Club", "Zoo Club"]
        );
        assert_eq!(collate("ecole", "école"), Ordering::Less);
        assert_eq!(collate("école", "f"), Ordering::Less);
    }

    #[test]
    fn test_only_ascii_digits_lead() {
        let catalog = ClubCatalog::from_clubs(vec![
            ClubRecord::named("Zoo Club"),
            ClubRecord::named("½ Marathon"),
            ClubRecord::named("2nd Chance"),
        ]);
        assert_eq!(names(&catalog)[0], "2nd Chance");
        assert!(!ClubRecord::named("½ Marathon").starts_with_digit());
    }

    #[tokio::test]
    async fn test_load_failure() {
        let source = StaticClubSource::failing();
        let err = ClubCatalog::load(&source).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status(503)));
    }

    #[tokio::test]
    async fn test_file_source_parse_error() {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("tf-clubs-bad-{}.json", nanos));
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let err = ClubCatalog::load(&FileClubSource::new(&path))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));

        let _ = std::fs::remove_file(path);
    }
}
