use crate::cache::{CacheKey, ResultCache};
use crate::catalog::CatalogAccess;
use crate::config::Config;
use crate::error::{RecommendError, Result};
use crate::models::*;
use crate::scoring::{score_personalization, score_similarity, Jitter};
use crate::utils::validation::{validate_days_back, validate_limit};
use crate::utils::{days_listed, rank_by_score};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const SIMILARITY_ALGORITHM: &str = "similarity-scoring";
pub const NEW_ARRIVALS_ALGORITHM: &str = "new-arrivals";
pub const PERSONALIZED_ALGORITHM: &str = "personalized";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarItemsRequest {
    pub limit: usize,
    pub variant: Variant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArrivalsRequest {
    pub limit: usize,
    pub days_back: Option<i64>,
    pub genre: Option<String>,
    pub variant: Variant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizedRequest {
    pub limit: usize,
    pub variant: Variant,
}

/// Ranking pipeline: retrieves candidates from the catalog, scores them per
/// variant, sorts (stable, descending) and truncates, memoizing results in
/// the injected TTL cache.
pub struct RecommendationService {
    catalog: Arc<dyn CatalogAccess>,
    cache: Arc<ResultCache>,
    config: Arc<Config>,
    jitter: Arc<dyn Jitter>,
    stats: DashMap<String, u64>,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn CatalogAccess>,
        cache: Arc<ResultCache>,
        config: Arc<Config>,
        jitter: Arc<dyn Jitter>,
    ) -> Self {
        Self {
            catalog,
            cache,
            config,
            jitter,
            stats: DashMap::new(),
        }
    }

    /// Live items whose release shares genre or artist with the reference,
    /// scored by similarity. The reference release itself is never included.
    pub async fn get_similar_items(
        &self,
        release_id: Uuid,
        request: &SimilarItemsRequest,
    ) -> Result<Arc<RecommendationResult>> {
        validate_limit(request.limit, self.config.recommendation.max_similar_limit)?;

        let reference = self
            .catalog
            .find_release(release_id)
            .await
            .map_err(|e| RecommendError::upstream("find_release", e))?
            .ok_or(RecommendError::NotFound(release_id))?;

        let key = CacheKey::new(
            release_id.to_string(),
            request.variant,
            RecommendationKind::Similar,
            request.limit,
        );
        if let Some(cached) = self.cache.get(&key) {
            self.increment_stat("similar_cache_hit");
            return Ok(cached);
        }
        self.increment_stat("similar_cache_miss");

        // Over-fetch so scoring has room to reorder before truncation.
        let fetch_limit = request.limit * self.config.recommendation.similar_overfetch_factor;
        let candidates = self
            .catalog
            .find_live_candidates_by_genre_or_artist(
                release_id,
                reference.genre.as_deref(),
                reference.artist.as_deref(),
                fetch_limit,
            )
            .await
            .map_err(|e| RecommendError::upstream("find_live_candidates_by_genre_or_artist", e))?;

        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|item| item.is_live() && item.release.id != release_id)
            .map(|item| {
                let relevance_score =
                    score_similarity(&reference, &item.release, request.variant, &*self.jitter);
                ScoredCandidate {
                    item,
                    relevance_score,
                    variant: request.variant,
                    days_listed: None,
                }
            })
            .collect();

        let ranked = rank_by_score(scored, request.limit);
        let result = Arc::new(RecommendationResult::new(
            release_id.to_string(),
            ranked,
            SIMILARITY_ALGORITHM,
            request.variant,
        ));

        self.cache.insert(
            key,
            Arc::clone(&result),
            self.config.cache.similar_ttl_seconds,
        );
        info!(
            "Computed {} similar items for release {} (variant {})",
            result.count, release_id, request.variant
        );
        Ok(result)
    }

    /// Live items listed within the window, newest first. No scoring applies;
    /// each candidate is annotated with how many days it has been listed.
    pub async fn get_new_arrivals(
        &self,
        request: &NewArrivalsRequest,
    ) -> Result<Arc<RecommendationResult>> {
        validate_limit(request.limit, self.config.recommendation.max_browse_limit)?;
        let days_back = request
            .days_back
            .unwrap_or(self.config.recommendation.default_days_back);
        validate_days_back(days_back)?;

        let subject = request.genre.clone().unwrap_or_else(|| "all".to_string());
        let key = CacheKey::new(
            subject.clone(),
            request.variant,
            RecommendationKind::NewArrivals,
            request.limit,
        );
        if let Some(cached) = self.cache.get(&key) {
            self.increment_stat("new_arrivals_cache_hit");
            return Ok(cached);
        }
        self.increment_stat("new_arrivals_cache_miss");

        let now = Utc::now();
        let cutoff = now - Duration::days(days_back);
        let mut items = self
            .catalog
            .find_live_items_listed_since(cutoff, request.genre.as_deref())
            .await
            .map_err(|e| RecommendError::upstream("find_live_items_listed_since", e))?;

        items.retain(|item| item.is_live());
        items.sort_by(|a, b| b.listed_at.cmp(&a.listed_at));
        items.truncate(request.limit);

        let recommendations: Vec<ScoredCandidate> = items
            .into_iter()
            .map(|item| {
                let listed = days_listed(item.listed_at, now);
                ScoredCandidate {
                    item,
                    relevance_score: 0.0,
                    variant: request.variant,
                    days_listed: Some(listed),
                }
            })
            .collect();

        let result = Arc::new(RecommendationResult::new(
            subject,
            recommendations,
            NEW_ARRIVALS_ALGORITHM,
            request.variant,
        ));

        self.cache.insert(
            key,
            Arc::clone(&result),
            self.config.cache.new_arrivals_ttl_seconds,
        );
        info!(
            "Computed {} new arrivals (genre {:?}, {} days back)",
            result.count, request.genre, days_back
        );
        Ok(result)
    }

    /// Wishlist-driven recommendations. An empty or fully-unresolvable
    /// wishlist falls back to new arrivals rather than erroring. Results are
    /// not cached: the wishlist makes every request caller-specific.
    pub async fn get_personalized(
        &self,
        wishlist_item_ids: &[Uuid],
        request: &PersonalizedRequest,
    ) -> Result<Arc<RecommendationResult>> {
        validate_limit(request.limit, self.config.recommendation.max_browse_limit)?;

        if wishlist_item_ids.is_empty() {
            return self.fallback_to_new_arrivals(request).await;
        }

        let wishlist_items = self
            .catalog
            .find_items(wishlist_item_ids)
            .await
            .map_err(|e| RecommendError::upstream("find_items", e))?;
        if wishlist_items.is_empty() {
            return self.fallback_to_new_arrivals(request).await;
        }

        let mut wished_genres: HashSet<String> = HashSet::new();
        let mut wished_artists: HashSet<String> = HashSet::new();
        let mut exclude_release_ids: HashSet<Uuid> = HashSet::new();
        for item in &wishlist_items {
            if let Some(genre) = &item.release.genre {
                wished_genres.insert(genre.clone());
            }
            if let Some(artist) = &item.release.artist {
                wished_artists.insert(artist.clone());
            }
            exclude_release_ids.insert(item.release.id);
        }

        let fetch_limit = request.limit * self.config.recommendation.personalized_overfetch_factor;
        let candidates = self
            .catalog
            .find_live_candidates_in_taste(
                &wished_genres,
                &wished_artists,
                &exclude_release_ids,
                fetch_limit,
            )
            .await
            .map_err(|e| RecommendError::upstream("find_live_candidates_in_taste", e))?;

        let now = Utc::now();
        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|item| item.is_live() && !exclude_release_ids.contains(&item.release.id))
            .map(|item| {
                let relevance_score =
                    score_personalization(&item.release, &wished_genres, &wished_artists, now);
                ScoredCandidate {
                    item,
                    relevance_score,
                    variant: request.variant,
                    days_listed: None,
                }
            })
            .collect();

        let ranked = rank_by_score(scored, request.limit);
        let result = Arc::new(RecommendationResult::new(
            WISHLIST_REFERENCE,
            ranked,
            PERSONALIZED_ALGORITHM,
            request.variant,
        ));
        info!(
            "Computed {} personalized items from {} wishlist entries",
            result.count,
            wishlist_items.len()
        );
        Ok(result)
    }

    async fn fallback_to_new_arrivals(
        &self,
        request: &PersonalizedRequest,
    ) -> Result<Arc<RecommendationResult>> {
        info!("Empty or unresolvable wishlist, falling back to new arrivals");
        self.get_new_arrivals(&NewArrivalsRequest {
            limit: request.limit,
            days_back: None,
            genre: None,
            variant: request.variant,
        })
        .await
    }

    pub fn stats(&self) -> HashMap<String, u64> {
        self.stats
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    fn increment_stat(&self, key: &str) {
        let mut counter = self.stats.entry(key.to_string()).or_insert(0);
        *counter += 1;
    }
}
