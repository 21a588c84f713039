// src/contact/rate_limit.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};

/// Where last-accepted timestamps live. The in-memory store suits a single
/// instance; a shared store (Redis etc.) can implement this for several.
#[async_trait::async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn last_seen(&self, key: &str) -> Result<Option<DateTime<Utc>>>;
    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Unbounded, process-lifetime map. Writes are plain overwrites; no eviction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RateLimitStore for MemoryStore {
    async fn last_seen(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let m = self
            .seen
            .lock()
            .map_err(|_| anyhow::anyhow!("rate-limit store mutex poisoned"))?;
        Ok(m.get(key).copied())
    }

    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        let mut m = self
            .seen
            .lock()
            .map_err(|_| anyhow::anyhow!("rate-limit store mutex poisoned"))?;
        m.insert(key.to_string(), at);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: ChronoDuration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }

    /// Whole seconds, rounded up, never below 1.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            RateDecision::Allowed => 0,
            RateDecision::Limited { retry_after } => {
                let ms = retry_after.num_milliseconds().max(0) as u64;
                ms.div_ceil(1000).max(1)
            }
        }
    }
}

/// Per-key cooldown gate.
/// - First request for a key always passes.
/// - Inside the cooldown, requests are limited and do NOT extend the window.
/// - An allowed request records `now` as the new window start.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    cooldown: ChronoDuration,
}

impl RateLimiter {
    /// `cooldown_secs` < 0 is treated as 0 (no cooldown).
    pub fn new(store: Arc<dyn RateLimitStore>, cooldown_secs: i64) -> Self {
        Self {
            store,
            cooldown: ChronoDuration::seconds(cooldown_secs.max(0)),
        }
    }

    pub fn in_memory(cooldown_secs: i64) -> Self {
        Self::new(Arc::new(MemoryStore::new()), cooldown_secs)
    }

    pub async fn check(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
        let last = match self.store.last_seen(key).await {
            Ok(v) => v,
            Err(e) => {
                // Store trouble must not block legitimate visitors
                tracing::warn!(error = ?e, "rate-limit store read failed, allowing");
                None
            }
        };

        if let Some(ts) = last {
            let elapsed = now.signed_duration_since(ts);
            if elapsed < self.cooldown {
                return RateDecision::Limited {
                    retry_after: self.cooldown - elapsed,
                };
            }
        }

        if let Err(e) = self.store.record(key, now).await {
            tracing::warn!(error = ?e, "rate-limit store write failed");
        }
        RateDecision::Allowed
    }
}
