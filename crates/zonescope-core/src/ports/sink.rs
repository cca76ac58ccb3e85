use async_trait::async_trait;

use crate::error::Result;
use crate::models::AnalysisResult;

/// Port for the "send to provider" action. Fire-and-forget: no response
/// contract beyond delivery success.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn send(&self, result: &AnalysisResult) -> Result<()>;
}
