use crate::models::{ClickEvent, Variant, VariantBundle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-variant conversion figures derived from shown bundles and the click
/// events attributed back to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConversion {
    pub variant: Variant,
    pub impressions: u64,
    pub clicks: u64,
    pub click_through_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub variants: Vec<VariantConversion>,
    pub total_bundles: usize,
    /// Clicks whose tracking id matched no known bundle.
    pub unattributed_clicks: u64,
}

impl ConversionSummary {
    /// Joins click events to bundles on tracking id and aggregates per
    /// variant. Each bundle counts one impression per arm it presented.
    pub fn from_events(bundles: &[VariantBundle], events: &[ClickEvent]) -> Self {
        let known: std::collections::HashSet<&str> =
            bundles.iter().map(|b| b.tracking_id.as_str()).collect();

        let mut impressions: HashMap<Variant, u64> = HashMap::new();
        for bundle in bundles {
            for arm in &bundle.arms {
                *impressions.entry(arm.variant).or_insert(0) += 1;
            }
        }

        let mut clicks: HashMap<Variant, u64> = HashMap::new();
        let mut unattributed = 0u64;
        for event in events {
            if known.contains(event.tracking_id.as_str()) {
                *clicks.entry(event.variant).or_insert(0) += 1;
            } else {
                unattributed += 1;
            }
        }

        let mut variants: Vec<VariantConversion> = impressions
            .into_iter()
            .map(|(variant, shown)| {
                let clicked = clicks.get(&variant).copied().unwrap_or(0);
                VariantConversion {
                    variant,
                    impressions: shown,
                    clicks: clicked,
                    click_through_rate: if shown > 0 {
                        clicked as f64 / shown as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect();
        variants.sort_by_key(|v| v.variant.as_str());

        Self {
            variants,
            total_bundles: bundles.len(),
            unattributed_clicks: unattributed,
        }
    }

    pub fn rate_for(&self, variant: Variant) -> Option<f64> {
        self.variants
            .iter()
            .find(|v| v.variant == variant)
            .map(|v| v.click_through_rate)
    }
}
