use crate::models::ScoredCandidate;
use chrono::{DateTime, Utc};

pub mod metrics;
pub mod validation;

/// Sorts candidates by score descending and truncates to `limit`.
///
/// `sort_by` is stable, so equal-score candidates keep their retrieval order.
pub fn rank_by_score(mut candidates: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(limit);
    candidates
}

/// Whole days an item has been listed, floored at zero for clock skew.
pub fn days_listed(listed_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - listed_at).num_days().max(0)
}
