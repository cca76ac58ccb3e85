use async_trait::async_trait;
use zonescope_core::models::AnalysisResult;
use zonescope_core::ports::ResultSink;
use zonescope_core::{Result, ZonescopeError};

/// Result sink that logs the serialized payload
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingResultSink;

#[async_trait]
impl ResultSink for LoggingResultSink {
    async fn send(&self, result: &AnalysisResult) -> Result<()> {
        let payload =
            serde_json::to_string(&result.summary()).map_err(|e| ZonescopeError::Serialization(e.to_string()))?;

        tracing::info!(payload = %payload, zones = result.intersecting_zones.len(), "Sending analysis to provider");
        Ok(())
    }
}
