use async_trait::async_trait;
use restock_core::{PipelineError, SourceSnapshot, UsageSource};
use tokio::sync::RwLock;

/// Serves a fixed snapshot; stands in for the relational store.
#[derive(Default)]
pub struct InMemoryUsageSource {
    snapshot: RwLock<SourceSnapshot>,
    unreachable: Option<String>,
}

impl InMemoryUsageSource {
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            unreachable: None,
        }
    }

    /// A source whose every read fails at the connect stage.
    pub fn unreachable(target: impl Into<String>) -> Self {
        Self {
            snapshot: RwLock::default(),
            unreachable: Some(target.into()),
        }
    }

    pub async fn replace(&self, snapshot: SourceSnapshot) {
        *self.snapshot.write().await = snapshot;
    }
}

#[async_trait]
impl UsageSource for InMemoryUsageSource {
    async fn snapshot(&self) -> Result<SourceSnapshot, PipelineError> {
        if let Some(target) = &self.unreachable {
            return Err(PipelineError::Connection {
                target: target.clone(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.snapshot.read().await.clone())
    }
}
