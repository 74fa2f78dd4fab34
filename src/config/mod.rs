use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub recommendation: RecommendationConfig,
    pub cache: CacheConfig,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Hard cap on `limit` for similar-items requests.
    pub max_similar_limit: usize,
    /// Hard cap on `limit` for new-arrivals and personalized requests.
    pub max_browse_limit: usize,
    /// Similar-items over-fetch multiplier applied before scoring reorders.
    pub similar_overfetch_factor: usize,
    /// Personalized over-fetch multiplier.
    pub personalized_overfetch_factor: usize,
    /// New-arrivals window when the caller does not supply one.
    pub default_days_back: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub similar_ttl_seconds: u64,
    pub new_arrivals_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// When true, click-sink failures surface as `RecordingFailed` instead of
    /// being logged and swallowed.
    pub strict_recording: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recommendation: RecommendationConfig {
                max_similar_limit: 50,
                max_browse_limit: 100,
                similar_overfetch_factor: 3,
                personalized_overfetch_factor: 2,
                default_days_back: 30,
            },
            cache: CacheConfig {
                similar_ttl_seconds: 3600,
                new_arrivals_ttl_seconds: 14400,
            },
            tracking: TrackingConfig {
                strict_recording: false,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GROOVEREC"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
