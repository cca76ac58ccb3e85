mod request;
mod response;

pub use request::{AnalyzeRequest, SearchParams};
pub use response::{
    AnalysisResponse, DismissResponse, HealthResponse, LayerInfo, RasterInfo, RemoveLayerResponse, SearchResponse,
    SendResponse, StatusResponse, UploadResponse, ZonesResponse,
};
