use crate::error::Result;
use crate::models::{Variant, VariantArm, VariantBundle};
use crate::services::recommendation::{RecommendationService, SimilarItemsRequest};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const CONTROL_DESCRIPTION: &str = "Standard similarity scoring";
pub const EXPERIMENTAL_DESCRIPTION: &str = "Enhanced genre-weighted scoring";
pub const CONTROL_ALGORITHM_TAG: &str = "similarity-scoring";
/// Label only: the experimental arm runs the same scoring function with the
/// experimental weight set, not a second algorithm.
pub const EXPERIMENTAL_ALGORITHM_TAG: &str = "similarity-scoring-v2";

/// A/B harness: runs the ranking pipeline once per variant for the same
/// release and packages the arms under a tracking id the click recorder can
/// join on later.
pub struct ExperimentService {
    recommendations: Arc<RecommendationService>,
}

impl ExperimentService {
    pub fn new(recommendations: Arc<RecommendationService>) -> Self {
        Self { recommendations }
    }

    pub async fn get_recommendation_variants(
        &self,
        release_id: Uuid,
        limit: usize,
    ) -> Result<VariantBundle> {
        let control = self
            .recommendations
            .get_similar_items(
                release_id,
                &SimilarItemsRequest {
                    limit,
                    variant: Variant::Control,
                },
            )
            .await?;
        let experimental = self
            .recommendations
            .get_similar_items(
                release_id,
                &SimilarItemsRequest {
                    limit,
                    variant: Variant::Experimental,
                },
            )
            .await?;

        let bundle = VariantBundle {
            reference_id: release_id,
            tracking_id: new_tracking_id(release_id),
            arms: vec![
                VariantArm {
                    variant: Variant::Control,
                    description: CONTROL_DESCRIPTION.to_string(),
                    algorithm: CONTROL_ALGORITHM_TAG.to_string(),
                    result: control,
                },
                VariantArm {
                    variant: Variant::Experimental,
                    description: EXPERIMENTAL_DESCRIPTION.to_string(),
                    algorithm: EXPERIMENTAL_ALGORITHM_TAG.to_string(),
                    result: experimental,
                },
            ],
            generated_at: Utc::now(),
        };

        info!(
            "Generated variant bundle {} for release {}",
            bundle.tracking_id, release_id
        );
        Ok(bundle)
    }
}

/// Tracking ids carry a random component so concurrent bundles for the same
/// release in the same clock tick can never collide.
fn new_tracking_id(release_id: Uuid) -> String {
    format!("{}-{}", release_id, Uuid::new_v4().simple())
}
