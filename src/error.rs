use thiserror::Error;
use uuid::Uuid;

/// Typed failures surfaced by the recommendation core.
///
/// `InvalidArgument` and `NotFound` map to caller errors; `Upstream` wraps
/// catalog/data-access failures and maps to an internal failure. Click
/// recording only produces `RecordingFailed` when strict recording is
/// enabled; the default policy swallows sink errors.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("release not found: {0}")]
    NotFound(Uuid),

    #[error("catalog access failed during {operation}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("click recording failed")]
    RecordingFailed(#[source] anyhow::Error),
}

impl RecommendError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RecommendError::InvalidArgument(msg.into())
    }

    pub fn upstream(operation: &'static str, source: anyhow::Error) -> Self {
        RecommendError::Upstream { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
