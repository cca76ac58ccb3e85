use crate::error::{Result, ZonescopeError};
use crate::models::{IntersectionMode, RasterLayer};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ZONES_PATH: &str = "data/no_fly_zones.geojson";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Set programmatically by the embedding application
    Override,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Override => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for zonescope
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub zones_path: ConfigValue<PathBuf>,
    pub intersection_mode: ConfigValue<IntersectionMode>,
    pub raster_opacity: ConfigValue<f64>,
    pub raster_resolution: ConfigValue<u32>,
    pub read_chunk_size: ConfigValue<usize>,
    pub geocoder_url: ConfigValue<String>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            zones_path: ConfigValue::new(PathBuf::from(DEFAULT_ZONES_PATH), ConfigSource::Default),
            intersection_mode: ConfigValue::new(IntersectionMode::Touching, ConfigSource::Default),
            raster_opacity: ConfigValue::new(RasterLayer::DEFAULT_OPACITY, ConfigSource::Default),
            raster_resolution: ConfigValue::new(
                RasterLayer::DEFAULT_RESOLUTION,
                ConfigSource::Default,
            ),
            read_chunk_size: ConfigValue::new(DEFAULT_READ_CHUNK_SIZE, ConfigSource::Default),
            geocoder_url: ConfigValue::new(DEFAULT_GEOCODER_URL.to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ZonescopeError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ZonescopeError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(zones_path) = file_config.zones_path {
            self.zones_path.update(zones_path, ConfigSource::File);
        }

        if let Some(mode) = file_config.intersection_mode {
            self.intersection_mode.update(mode, ConfigSource::File);
        }

        if let Some(opacity) = file_config.raster_opacity {
            self.raster_opacity.update(validate_opacity(opacity)?, ConfigSource::File);
        }

        if let Some(resolution) = file_config.raster_resolution {
            self.raster_resolution.update(validate_resolution(resolution)?, ConfigSource::File);
        }

        if let Some(chunk_size) = file_config.read_chunk_size {
            self.read_chunk_size.update(validate_chunk_size(chunk_size)?, ConfigSource::File);
        }

        if let Some(url) = file_config.geocoder_url {
            self.geocoder_url.update(url, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // ZONESCOPE_ZONES_PATH
        if let Ok(path) = env::var("ZONESCOPE_ZONES_PATH") {
            self.zones_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // ZONESCOPE_INTERSECTION_MODE
        if let Ok(mode_str) = env::var("ZONESCOPE_INTERSECTION_MODE") {
            match parse_intersection_mode(&mode_str) {
                Ok(mode) => self.intersection_mode.update(mode, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ZONESCOPE_INTERSECTION_MODE value '{}': expected touching or interior_overlap",
                    mode_str
                ),
            }
        }

        // ZONESCOPE_RASTER_OPACITY
        if let Ok(opacity_str) = env::var("ZONESCOPE_RASTER_OPACITY") {
            match opacity_str.parse::<f64>().ok().filter(|v| (0.0..=1.0).contains(v)) {
                Some(opacity) => self.raster_opacity.update(opacity, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid ZONESCOPE_RASTER_OPACITY value '{}': expected a number between 0 and 1",
                    opacity_str
                ),
            }
        }

        // ZONESCOPE_RASTER_RESOLUTION
        if let Ok(resolution_str) = env::var("ZONESCOPE_RASTER_RESOLUTION") {
            match resolution_str.parse::<u32>().ok().filter(|v| *v > 0) {
                Some(resolution) => {
                    self.raster_resolution.update(resolution, ConfigSource::Environment)
                }
                None => tracing::warn!(
                    "Invalid ZONESCOPE_RASTER_RESOLUTION value '{}': expected a positive integer",
                    resolution_str
                ),
            }
        }

        // ZONESCOPE_READ_CHUNK_SIZE
        if let Ok(chunk_str) = env::var("ZONESCOPE_READ_CHUNK_SIZE") {
            match chunk_str.parse::<usize>().ok().filter(|v| *v > 0) {
                Some(chunk_size) => {
                    self.read_chunk_size.update(chunk_size, ConfigSource::Environment)
                }
                None => tracing::warn!(
                    "Invalid ZONESCOPE_READ_CHUNK_SIZE value '{}': expected a positive byte count",
                    chunk_str
                ),
            }
        }

        // ZONESCOPE_GEOCODER_URL
        if let Ok(url) = env::var("ZONESCOPE_GEOCODER_URL") {
            self.geocoder_url.update(url, ConfigSource::Environment);
        }

        self
    }

    /// Apply programmatic overrides, which beat every other source
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(zones_path) = overrides.zones_path {
            self.zones_path.update(zones_path, ConfigSource::Override);
        }

        if let Some(mode) = overrides.intersection_mode {
            self.intersection_mode.update(mode, ConfigSource::Override);
        }

        if let Some(opacity) = overrides.raster_opacity {
            self.raster_opacity.update(opacity, ConfigSource::Override);
        }

        if let Some(resolution) = overrides.raster_resolution {
            self.raster_resolution.update(resolution, ConfigSource::Override);
        }

        if let Some(chunk_size) = overrides.read_chunk_size {
            self.read_chunk_size.update(chunk_size, ConfigSource::Override);
        }

        if let Some(url) = overrides.geocoder_url {
            self.geocoder_url.update(url, ConfigSource::Override);
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    zones_path: Option<PathBuf>,
    intersection_mode: Option<IntersectionMode>,
    raster_opacity: Option<f64>,
    raster_resolution: Option<u32>,
    read_chunk_size: Option<usize>,
    geocoder_url: Option<String>,
}

/// Programmatic configuration overrides
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub zones_path: Option<PathBuf>,
    pub intersection_mode: Option<IntersectionMode>,
    pub raster_opacity: Option<f64>,
    pub raster_resolution: Option<u32>,
    pub read_chunk_size: Option<usize>,
    pub geocoder_url: Option<String>,
}

/// Parse intersection mode from string
pub fn parse_intersection_mode(s: &str) -> Result<IntersectionMode> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "touching" | "touches" => Ok(IntersectionMode::Touching),
        "interior_overlap" | "interior" => Ok(IntersectionMode::InteriorOverlap),
        _ => Err(ZonescopeError::ConfigInvalid {
            key: "intersection_mode".to_string(),
            reason: format!("Invalid intersection mode: {}. Use touching or interior_overlap", s),
        }),
    }
}

fn validate_opacity(opacity: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(opacity)
    } else {
        Err(ZonescopeError::ConfigInvalid {
            key: "raster_opacity".to_string(),
            reason: format!("Opacity {} is outside [0, 1]", opacity),
        })
    }
}

fn validate_resolution(resolution: u32) -> Result<u32> {
    if resolution > 0 {
        Ok(resolution)
    } else {
        Err(ZonescopeError::ConfigInvalid {
            key: "raster_resolution".to_string(),
            reason: "Resolution must be positive".to_string(),
        })
    }
}

fn validate_chunk_size(chunk_size: usize) -> Result<usize> {
    if chunk_size > 0 {
        Ok(chunk_size)
    } else {
        Err(ZonescopeError::ConfigInvalid {
            key: "read_chunk_size".to_string(),
            reason: "Chunk size must be positive".to_string(),
        })
    }
}
