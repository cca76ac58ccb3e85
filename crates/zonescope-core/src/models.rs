pub mod analysis;
pub mod geometry;
pub mod job;
pub mod layer;

pub use analysis::{AnalysisResult, AnalysisSummary, Measurement};
pub use geometry::{BoundingBox, IntersectionMode, Polygon};
pub use job::{FileKind, IngestionJob, JobEvent, JobStatus};
pub use layer::{
    Extent, GeoTransform, LayerKey, LayerKind, OverlayLayer, RasterGrid, RasterLayer, VectorLayer,
    VectorStyle,
};
