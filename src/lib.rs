pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod scoring;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RecommendError, Result};
pub use models::*;

use scoring::ThreadJitter;
use std::sync::Arc;

/// Wires the recommendation core together. The cache is constructed here and
/// injected into the pipeline: it lives for the lifetime of the state and
/// does not persist across restarts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn catalog::CatalogAccess>,
    pub cache: Arc<cache::ResultCache>,
    pub recommendations: Arc<services::recommendation::RecommendationService>,
    pub experiments: Arc<services::experiments::ExperimentService>,
    pub clicks: Arc<services::tracking::ClickRecorder>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn catalog::CatalogAccess>,
        click_sink: Arc<dyn services::tracking::ClickSink>,
    ) -> Self {
        let config = Arc::new(config);
        let cache = Arc::new(cache::ResultCache::new());

        let recommendations = Arc::new(services::recommendation::RecommendationService::new(
            Arc::clone(&catalog),
            Arc::clone(&cache),
            Arc::clone(&config),
            Arc::new(ThreadJitter),
        ));

        let experiments = Arc::new(services::experiments::ExperimentService::new(Arc::clone(
            &recommendations,
        )));

        let clicks = Arc::new(services::tracking::ClickRecorder::new(
            click_sink,
            config.tracking.strict_recording,
        ));

        Self {
            config,
            catalog,
            cache,
            recommendations,
            experiments,
            clicks,
        }
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
