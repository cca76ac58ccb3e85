use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Best match for a free-text place query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub display_name: String,
}

/// Port for free-text place search
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a query to its single best match.
    ///
    /// `Ok(None)` means the service answered with no results; an
    /// unreachable service is `Err(GeocodeUnavailable)`.
    async fn geocode(&self, query: &str) -> Result<Option<GeocodeMatch>>;
}
