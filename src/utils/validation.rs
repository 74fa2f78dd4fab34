use crate::error::{RecommendError, Result};

/// Rejects a zero or over-cap result limit. A zero limit is always a caller
/// bug, not a request for an empty result.
pub fn validate_limit(limit: usize, max: usize) -> Result<()> {
    if limit == 0 {
        return Err(RecommendError::invalid("limit must be greater than 0"));
    }
    if limit > max {
        return Err(RecommendError::invalid(format!(
            "limit too large: {} (max {})",
            limit, max
        )));
    }
    Ok(())
}

pub fn validate_days_back(days_back: i64) -> Result<()> {
    if days_back <= 0 {
        return Err(RecommendError::invalid("daysBack must be greater than 0"));
    }
    Ok(())
}

/// Click recording requires every attribution field; a click that cannot be
/// attributed is useless for conversion analysis.
pub fn validate_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecommendError::invalid(format!("{} cannot be empty", field)));
    }
    Ok(())
}
