use crate::error::{RecommendError, Result};
use crate::models::{ClickEvent, Variant};
use crate::utils::validation::validate_non_empty;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// Append-only persistence for click events. Implementations live with the
/// host (database table, event log); the in-memory sink below serves tests
/// and single-process deployments.
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    async fn append(&self, event: &ClickEvent) -> anyhow::Result<()>;
}

pub struct InMemoryClickSink {
    events: RwLock<Vec<ClickEvent>>,
}

impl InMemoryClickSink {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    pub async fn events(&self) -> Vec<ClickEvent> {
        self.events.read().await.clone()
    }
}

impl Default for InMemoryClickSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ClickSink for InMemoryClickSink {
    async fn append(&self, event: &ClickEvent) -> anyhow::Result<()> {
        let mut events = self.events.write().await;
        events.push(event.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    pub tracking_id: String,
    pub variant: Variant,
    pub item_id: Uuid,
    pub buyer_id: Option<String>,
}

/// Records recommendation click-throughs for conversion analysis.
///
/// The recorder sits on the buyer-facing redirect path, so by default sink
/// failures are logged and swallowed rather than blocking the caller. With
/// `strict` enabled, failures surface as `RecordingFailed`.
pub struct ClickRecorder {
    sink: Arc<dyn ClickSink>,
    strict: bool,
}

impl ClickRecorder {
    pub fn new(sink: Arc<dyn ClickSink>, strict: bool) -> Self {
        Self { sink, strict }
    }

    pub async fn record(&self, request: &ClickRequest) -> Result<ClickEvent> {
        validate_non_empty(&request.tracking_id, "trackingId")?;
        if request.item_id.is_nil() {
            return Err(RecommendError::invalid("itemId cannot be nil"));
        }

        let mut event =
            ClickEvent::new(request.tracking_id.clone(), request.variant, request.item_id);
        if let Some(buyer_id) = &request.buyer_id {
            if !buyer_id.trim().is_empty() {
                event = event.with_buyer(buyer_id.clone());
            }
        }

        match self.sink.append(&event).await {
            Ok(()) => {
                info!(
                    "Recorded click on item {} (variant {}, tracking {})",
                    event.item_id, event.variant, event.tracking_id
                );
                Ok(event)
            }
            Err(e) if self.strict => Err(RecommendError::RecordingFailed(e)),
            Err(e) => {
                error!(
                    "Click recording failed for tracking {} (variant {}): {:#}",
                    event.tracking_id, event.variant, e
                );
                Ok(event)
            }
        }
    }
}
