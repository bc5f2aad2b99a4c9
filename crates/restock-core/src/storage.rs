use async_trait::async_trait;

use crate::error::{PipelineError, PublishError};
use crate::models::SourceSnapshot;

/// Read side: both result sets come back from one scoped session.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn snapshot(&self) -> Result<SourceSnapshot, PipelineError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub location: String,
    pub bytes: usize,
}

/// Write side: deposits a serialized table under a logical file name.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    fn describe(&self) -> String;

    async fn publish(&self, file_name: &str, body: Vec<u8>)
    -> Result<PublishReceipt, PublishError>;
}
