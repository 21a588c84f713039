// src/content/types.rs
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a caller is asking the resolver for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Recent social activity (one featured post when only curated data exists).
    Activity,
    /// Profile identity plus the most recent posts.
    Profile,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Activity => "activity",
            ContentKind::Profile => "profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Post,
    Repost,
    Comment,
    Article,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub date: NaiveDate, // "YYYY-MM-DD"
    #[serde(default)]
    pub has_comment: bool,
}

/// Raw result of one source, before policies are applied.
/// Missing identity fields are filled from the configured profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePayload {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub activity: Vec<ActivityItem>,
    pub note: String,
}

/// Stable output shape returned by the content endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPayload {
    pub name: String,
    pub headline: String,
    pub location: String,
    pub recent_activity: Vec<ActivityItem>,
    pub last_updated: DateTime<Utc>,
    pub source_note: String,
    /// Name of the source that served this payload.
    pub source: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("curated file missing: {}", .0.display())]
    Missing(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source produced no usable content")]
    Empty,
}

impl SourceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Http(e) if e.is_timeout())
    }
}

#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// `today` is the rotation key for sources that pick among curated entries.
    async fn fetch(&self, kind: ContentKind, today: NaiveDate)
        -> Result<SourcePayload, SourceError>;
    fn name(&self) -> &'static str;
}
