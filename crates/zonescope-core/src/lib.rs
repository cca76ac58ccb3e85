//! Zonescope Core - Domain models, file formats, ports, and configuration
//!
//! This crate contains the shared domain types for the zonescope workspace:
//! drawn polygons, analysis results, overlay layers, ingestion jobs, and the
//! decoders that turn uploaded vector and raster files into overlay layers.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod ports;

pub use error::{FailureCategory, Result, ZonescopeError};
