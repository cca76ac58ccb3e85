pub mod geocode;
pub mod ingest;
pub mod session;
pub mod sink;

pub use geocode::NominatimGeocoder;
pub use ingest::{FileIngestionPipeline, IngestedLayer, UploadSource};
pub use session::{AnalysisSession, IngestOutcome};
pub use sink::LoggingResultSink;
