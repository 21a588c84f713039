// src/content/sources/emergency.rs
use chrono::NaiveDate;

use crate::config::ProfileIdentity;
use crate::content::types::{
    ActivityItem, ActivityKind, ContentKind, ContentSource, SourceError, SourcePayload,
};

pub const SOURCE_NAME: &str = "emergency-default";
pub const EMERGENCY_POST: &str =
    "The future of QA is AI-powered, but human insight remains irreplaceable";

/// Last link of the chain. Built only from compiled-in data, so it cannot fail.
#[derive(Debug, Clone)]
pub struct EmergencySource {
    identity: ProfileIdentity,
}

impl EmergencySource {
    pub fn new(identity: ProfileIdentity) -> Self {
        Self { identity }
    }

    pub fn payload(&self, _kind: ContentKind, today: NaiveDate) -> SourcePayload {
        SourcePayload {
            name: Some(self.identity.name.clone()),
            headline: Some(self.identity.headline.clone()),
            location: Some(self.identity.location.clone()),
            activity: vec![ActivityItem {
                id: "1".to_string(),
                content: EMERGENCY_POST.to_string(),
                kind: ActivityKind::Post,
                date: today,
                has_comment: true,
            }],
            note: "Using emergency fallback content".to_string(),
        }
    }
}

impl Default for EmergencySource {
    fn default() -> Self {
        Self::new(ProfileIdentity::default())
    }
}

#[async_trait::async_trait]
impl ContentSource for EmergencySource {
    async fn fetch(
        &self,
        kind: ContentKind,
        today: NaiveDate,
    ) -> Result<SourcePayload, SourceError> {
        Ok(self.payload(kind, today))
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}
