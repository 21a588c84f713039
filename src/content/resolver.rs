// src/content/resolver.rs
//! Tiered content resolution: try each source in priority order, stop at the
//! first success, then normalize to `ResolvedPayload`. Never fails; the
//! embedded emergency content is the terminal fallback.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;

use crate::clock::Clock;
use crate::config::{ProfileIdentity, SiteConfig};
use crate::content::policy::ActivityPolicy;
use crate::content::sources::{CuratedSource, EmergencySource, LinkedInSource};
use crate::content::types::{ContentKind, ContentSource, ResolvedPayload, SourcePayload};

#[derive(Debug, Clone)]
struct CachedPayload {
    payload: ResolvedPayload,
    stored_at: DateTime<Utc>,
}

pub struct ContentResolver {
    sources: Vec<Arc<dyn ContentSource>>,
    terminal: EmergencySource,
    identity: ProfileIdentity,
    policy: ActivityPolicy,
    clock: Arc<dyn Clock>,
    cache_ttl: chrono::Duration,
    cache: RwLock<HashMap<ContentKind, CachedPayload>>,
}

impl ContentResolver {
    /// Resolver over an explicit chain. Reuse cache is off until `with_cache_ttl`.
    pub fn new(
        sources: Vec<Arc<dyn ContentSource>>,
        identity: ProfileIdentity,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            terminal: EmergencySource::new(identity.clone()),
            identity,
            policy: ActivityPolicy::default(),
            clock,
            cache_ttl: chrono::Duration::zero(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Default chain: live scrape (if enabled) → curated files → emergency constant.
    pub fn from_config(cfg: &SiteConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let mut sources: Vec<Arc<dyn ContentSource>> = Vec::with_capacity(3);
        if cfg.content.live_enabled {
            sources.push(Arc::new(LinkedInSource::from_url(
                cfg.profile.linkedin_url.clone(),
                Duration::from_secs(cfg.content.live_timeout_secs),
            )?));
        }
        sources.push(Arc::new(CuratedSource::new(
            cfg.content.posts_path.clone(),
            cfg.content.profile_path.clone(),
        )));
        sources.push(Arc::new(EmergencySource::new(cfg.profile.clone())));

        Ok(Self::new(sources, cfg.profile.clone(), clock)
            .with_policy(ActivityPolicy {
                truncate_chars: cfg.content.truncate_chars,
                max_items: cfg.content.max_items,
            })
            .with_cache_ttl(cfg.content.cache_ttl_secs))
    }

    pub fn with_policy(mut self, policy: ActivityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 0 disables reuse.
    pub fn with_cache_ttl(mut self, secs: u64) -> Self {
        self.cache_ttl = chrono::Duration::seconds(secs.min(i64::MAX as u64) as i64);
        self
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, kind: ContentKind) -> ResolvedPayload {
        let now = self.clock.now();
        if let Some(hit) = self.cached(kind, now) {
            tracing::debug!(kind = kind.as_str(), source = %hit.source, "content cache hit");
            return hit;
        }

        let today = now.date_naive();
        let mut served: Option<(&'static str, SourcePayload)> = None;
        for src in &self.sources {
            match src.fetch(kind, today).await {
                Ok(p) => {
                    served = Some((src.name(), p));
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        source = src.name(),
                        kind = kind.as_str(),
                        timeout = e.is_timeout(),
                        error = %e,
                        "content source failed, falling back"
                    );
                    counter!("content_source_errors_total", "source" => src.name()).increment(1);
                }
            }
        }

        let (source, payload) = served.unwrap_or_else(|| {
            (
                self.terminal.name(),
                self.terminal.payload(kind, today),
            )
        });

        counter!("content_resolve_total", "kind" => kind.as_str(), "source" => source)
            .increment(1);
        let resolved = self.finish(source, payload, now);
        self.store(kind, &resolved, now);
        resolved
    }

    fn finish(
        &self,
        source: &'static str,
        payload: SourcePayload,
        now: DateTime<Utc>,
    ) -> ResolvedPayload {
        ResolvedPayload {
            name: non_empty_or(payload.name, &self.identity.name),
            headline: non_empty_or(payload.headline, &self.identity.headline),
            location: non_empty_or(payload.location, &self.identity.location),
            recent_activity: self.policy.apply(payload.activity),
            last_updated: now,
            source_note: payload.note,
            source: source.to_string(),
        }
    }

    fn cached(&self, kind: ContentKind, now: DateTime<Utc>) -> Option<ResolvedPayload> {
        if self.cache_ttl <= chrono::Duration::zero() {
            return None;
        }
        let guard = self.cache.read().ok()?;
        let entry = guard.get(&kind)?;
        // Rotation keys on the calendar day, so a stale day is a miss too
        let fresh = now.signed_duration_since(entry.stored_at) < self.cache_ttl
            && entry.stored_at.date_naive() == now.date_naive();
        fresh.then(|| entry.payload.clone())
    }

    fn store(&self, kind: ContentKind, payload: &ResolvedPayload, now: DateTime<Utc>) {
        if self.cache_ttl <= chrono::Duration::zero() {
            return;
        }
        if let Ok(mut guard) = self.cache.write() {
            guard.insert(
                kind,
                CachedPayload {
                    payload: payload.clone(),
                    stored_at: now,
                },
            );
        }
    }
}

fn non_empty_or(v: Option<String>, fallback: &str) -> String {
    v.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
