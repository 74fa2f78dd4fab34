use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Buyer id recorded when a click arrives without an authenticated buyer.
pub const ANONYMOUS_BUYER: &str = "anonymous";

/// Reference id used for personalized results, which have no single subject release.
pub const WISHLIST_REFERENCE: &str = "wishlist";

/// Immutable release metadata owned by the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: Uuid,
    pub title: String,
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub release_year: Option<i32>,
    pub cover_art_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Live,
    Sold,
    Draft,
}

/// A live inventory item eligible for recommendation, produced fresh per
/// request by the catalog. Carries its release inline so scoring never has
/// to re-resolve metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: Uuid,
    pub release: Release,
    pub status: ListingStatus,
    pub listed_at: DateTime<Utc>,
    pub price_cents: Option<u32>,
}

impl CandidateItem {
    pub fn is_live(&self) -> bool {
        self.status == ListingStatus::Live
    }
}

/// Named scoring parameterization used for A/B comparison. A variant selects
/// weights inside the same scoring function; it is never a separate algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Control,
    Experimental,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Control => "control",
            Variant::Experimental => "experimental",
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Control
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation families, used as the cache-key discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    Similar,
    NewArrivals,
    Personalized,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Similar => "similar",
            RecommendationKind::NewArrivals => "new-arrivals",
            RecommendationKind::Personalized => "personalized",
        }
    }
}

/// A candidate plus the score computed for it during ranking. Transient:
/// built during a pipeline run, then owned by the result it ranks in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub item: CandidateItem,
    pub relevance_score: f64,
    pub variant: Variant,
    /// Set only for new-arrivals results, where recency is the ranking.
    pub days_listed: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub reference_id: String,
    /// Rank order: highest score first, retrieval order on ties.
    pub recommendations: Vec<ScoredCandidate>,
    pub algorithm: String,
    pub variant: Variant,
    pub generated_at: DateTime<Utc>,
    pub count: usize,
}

impl RecommendationResult {
    pub fn new(
        reference_id: impl Into<String>,
        recommendations: Vec<ScoredCandidate>,
        algorithm: impl Into<String>,
        variant: Variant,
    ) -> Self {
        let count = recommendations.len();
        Self {
            reference_id: reference_id.into(),
            recommendations,
            algorithm: algorithm.into(),
            variant,
            generated_at: Utc::now(),
            count,
        }
    }
}

/// One arm of an A/B comparison: a variant's result plus its display labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantArm {
    pub variant: Variant,
    pub description: String,
    pub algorithm: String,
    pub result: std::sync::Arc<RecommendationResult>,
}

/// Two or more variant results generated atomically from the same request.
/// The tracking id is the join key for later click attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantBundle {
    pub reference_id: Uuid,
    pub tracking_id: String,
    pub arms: Vec<VariantArm>,
    pub generated_at: DateTime<Utc>,
}

/// Append-only record of a buyer interacting with a shown recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub tracking_id: String,
    pub variant: Variant,
    pub item_id: Uuid,
    pub buyer_id: String,
    pub recorded_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(tracking_id: impl Into<String>, variant: Variant, item_id: Uuid) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            variant,
            item_id,
            buyer_id: ANONYMOUS_BUYER.to_string(),
            recorded_at: Utc::now(),
        }
    }

    pub fn with_buyer(mut self, buyer_id: impl Into<String>) -> Self {
        self.buyer_id = buyer_id.into();
        self
    }
}

impl Release {
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genre: None,
            artist: None,
            release_year: None,
            cover_art_url: None,
            created_at: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
