// src/content/sources/curated.rs
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::content::policy;
use crate::content::types::{ActivityItem, ContentKind, ContentSource, SourceError, SourcePayload};

pub const SOURCE_NAME: &str = "curated-file";

/// On-disk shape of `data/linkedin-posts.json`, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CuratedPostSet {
    pub posts: Vec<ActivityItem>,
}

impl CuratedPostSet {
    pub async fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = read_existing(path).await?;
        serde_json::from_str(&raw)
            .map_err(|e| SourceError::Malformed(format!("{}: {e}", path.display())))
    }

    /// Newest first; older entries beyond `keep` are dropped.
    pub fn prepend(&mut self, item: ActivityItem, keep: usize) {
        self.posts.insert(0, item);
        self.posts.truncate(keep.max(1));
    }

    /// Used by the out-of-band editor only; the resolver never writes.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let body = serde_json::to_string_pretty(self).context("serialize curated posts")?;
        std::fs::write(path, body)
            .with_context(|| format!("writing curated posts to {}", path.display()))
    }
}

/// Subset of `data/profile.json` that the resolver needs. Other fields
/// (experience, education, skills...) are ignored.
#[derive(Debug, Clone, Deserialize)]
struct ProfileRecord {
    name: Option<String>,
    headline: Option<String>,
    location: Option<String>,
}

/// Reads the curated JSON files on every call. No caching, no file watching.
#[derive(Debug, Clone)]
pub struct CuratedSource {
    posts_path: PathBuf,
    profile_path: PathBuf,
}

impl CuratedSource {
    pub fn new(posts_path: impl Into<PathBuf>, profile_path: impl Into<PathBuf>) -> Self {
        Self {
            posts_path: posts_path.into(),
            profile_path: profile_path.into(),
        }
    }

    async fn featured_post(&self, today: NaiveDate) -> Result<SourcePayload, SourceError> {
        let set = CuratedPostSet::load(&self.posts_path).await?;
        let visible = policy::filter_visible(set.posts);
        let picked = policy::rotate(&visible, today)
            .cloned()
            .ok_or(SourceError::Empty)?;

        Ok(SourcePayload {
            activity: vec![picked],
            note: "Using curated content. Live source not available.".to_string(),
            ..SourcePayload::default()
        })
    }

    async fn profile(&self) -> Result<SourcePayload, SourceError> {
        let raw = read_existing(&self.profile_path).await?;
        let rec: ProfileRecord = serde_json::from_str(&raw).map_err(|e| {
            SourceError::Malformed(format!("{}: {e}", self.profile_path.display()))
        })?;

        // Posts are a bonus here: a missing posts file still leaves a usable profile.
        let activity = match CuratedPostSet::load(&self.posts_path).await {
            Ok(set) => policy::filter_visible(set.posts),
            Err(e) => {
                tracing::debug!(error = %e, "curated posts unavailable for profile");
                Vec::new()
            }
        };

        Ok(SourcePayload {
            name: rec.name,
            headline: rec.headline,
            location: rec.location,
            activity,
            note: "Using curated profile data.".to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ContentSource for CuratedSource {
    async fn fetch(
        &self,
        kind: ContentKind,
        today: NaiveDate,
    ) -> Result<SourcePayload, SourceError> {
        match kind {
            ContentKind::Activity => self.featured_post(today).await,
            ContentKind::Profile => self.profile().await,
        }
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

async fn read_existing(path: &Path) -> Result<String, SourceError> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SourceError::Missing(path.to_path_buf()))
        }
        Err(e) => Err(SourceError::Io(e)),
    }
}
