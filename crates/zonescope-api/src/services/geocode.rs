use async_trait::async_trait;
use serde::Deserialize;
use zonescope_core::ports::{GeocodeMatch, Geocoder};
use zonescope_core::{Result, ZonescopeError};

/// Nominatim place search
pub struct NominatimGeocoder {
    /// Base URL for the Nominatim API (e.g., "https://nominatim.openstreetmap.org")
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        // Nominatim rejects requests without an identifying user agent
        let client = reqwest::Client::builder()
            .user_agent(concat!("zonescope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ZonescopeError::GeocodeUnavailable {
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), client })
    }

    fn search_url(&self, query: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[("format", "json"), ("limit", "1"), ("q", query)],
        )
        .map_err(|e| ZonescopeError::GeocodeUnavailable {
            reason: format!("Invalid geocoder URL '{}': {}", self.base_url, e),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodeMatch>> {
        let url = self.search_url(query)?;

        let response = self.client.get(url).send().await.map_err(|e| ZonescopeError::GeocodeUnavailable {
            reason: format!("Failed to connect to {}: {}", self.base_url, e),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ZonescopeError::GeocodeUnavailable {
                reason: format!("Geocoder error ({}): {}", status, error_text),
            });
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| ZonescopeError::GeocodeUnavailable {
            reason: format!("Failed to parse geocoder response: {}", e),
        })?;

        places.into_iter().next().map(NominatimPlace::into_match).transpose()
    }
}

/// One entry of a Nominatim search response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimPlace {
    fn into_match(self) -> Result<GeocodeMatch> {
        let parse = |value: &str| {
            value.parse::<f64>().map_err(|e| ZonescopeError::GeocodeUnavailable {
                reason: format!("Invalid coordinate '{}' in geocoder response: {}", value, e),
            })
        };

        Ok(GeocodeMatch { coordinates: [parse(&self.lon)?, parse(&self.lat)?], display_name: self.display_name })
    }
}
