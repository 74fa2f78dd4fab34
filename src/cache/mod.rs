use crate::models::{RecommendationKind, RecommendationResult, Variant};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Cache key: the subject being recommended against (a release id, a genre,
/// or "all"), the scoring variant, the recommendation family, and the
/// requested limit. The limit is part of the request shape: without it a
/// result computed for a large limit would be served verbatim to a later
/// smaller-limit request and exceed that request's count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub subject: String,
    pub variant: Variant,
    pub kind: RecommendationKind,
    pub limit: usize,
}

impl CacheKey {
    pub fn new(
        subject: impl Into<String>,
        variant: Variant,
        kind: RecommendationKind,
        limit: usize,
    ) -> Self {
        Self {
            subject: subject.into(),
            variant,
            kind,
            limit,
        }
    }
}

struct CacheEntry {
    value: Arc<RecommendationResult>,
    expires_at: DateTime<Utc>,
}

/// TTL-expiring memo of ranking-pipeline outputs.
///
/// Entries are immutable once written: a hit hands back the Arc stored at
/// write time, never a recomputation. Writers race with last-write-wins;
/// readers can never observe a partial entry. There is no size bound beyond
/// TTL expiry.
#[derive(Default)]
pub struct ResultCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached result if present and unexpired.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<RecommendationResult>> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        Some(Arc::clone(&entry.value))
    }

    pub fn insert(&self, key: CacheKey, value: Arc<RecommendationResult>, ttl_seconds: u64) {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds as i64);
        self.insert_with_expiry(key, value, expires_at);
    }

    pub fn insert_with_expiry(
        &self,
        key: CacheKey,
        value: Arc<RecommendationResult>,
        expires_at: DateTime<Utc>,
    ) {
        debug!(subject = %key.subject, variant = %key.variant, kind = key.kind.as_str(), "cache store");
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Drops expired entries. Optional housekeeping for long-lived hosts;
    /// `get` already treats expired entries as misses.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
