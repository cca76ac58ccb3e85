#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use zonescope_api::services::{AnalysisSession, FileIngestionPipeline};
use zonescope_core::formats::DecodeOptions;
use zonescope_core::models::{IntersectionMode, LayerKey, OverlayLayer, Polygon};
use zonescope_core::ports::{GeocodeMatch, Geocoder};
use zonescope_core::{Result, ZonescopeError};
use zonescope_geo::{ZoneDataset, ZoneIntersectionIndex};
use zonescope_store::{LayerSnapshot, OverlayRegistry, OverlayStore};

pub const ZONES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"name": "Ben Gurion Airport"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[34.86, 31.99], [34.90, 31.99], [34.90, 32.02], [34.86, 32.02], [34.86, 31.99]]]
            }
        },
        {
            "type": "Feature",
            "properties": {"name": "Knesset"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[35.20, 31.77], [35.21, 31.77], [35.21, 31.78], [35.20, 31.78], [35.20, 31.77]]]
            }
        }
    ]
}"#;

pub const AREA_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[34.7, 32.0], [34.8, 32.0], [34.8, 32.1], [34.7, 32.1], [34.7, 32.0]]]
        }
    }]
}"#;

/// Axis-aligned square ring
pub fn square(min_x: f64, min_y: f64, size: f64) -> Polygon {
    Polygon::new(vec![
        [min_x, min_y],
        [min_x + size, min_y],
        [min_x + size, min_y + size],
        [min_x, min_y + size],
        [min_x, min_y],
    ])
}

/// Encode a georeferenced single-band float GeoTIFF in memory
pub fn encode_geotiff(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buffer).unwrap();
        let mut image = encoder.new_image::<colortype::Gray32Float>(width, height).unwrap();
        image.encoder().write_tag(Tag::ModelPixelScaleTag, &[0.001f64, 0.001, 0.0][..]).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 34.8, 32.1, 0.0][..])
            .unwrap();
        image.encoder().write_tag(Tag::GeoKeyDirectoryTag, &[1u16, 1, 0, 1, 2048, 0, 1, 4326][..]).unwrap();
        let data: Vec<f32> = (0..width * height).map(|v| v as f32).collect();
        image.write_data(&data).unwrap();
    }
    buffer.into_inner()
}

/// Overlay store that counts mutations
#[derive(Default)]
pub struct CountingStore {
    inner: OverlayRegistry,
    pub adds: AtomicUsize,
    pub removes: AtomicUsize,
}

impl CountingStore {
    pub fn mutations(&self) -> usize {
        self.adds.load(Ordering::SeqCst) + self.removes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OverlayStore for CountingStore {
    async fn add(&self, key: LayerKey, layer: OverlayLayer) -> Result<()> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.inner.add(key, layer).await
    }

    async fn get(&self, key: &LayerKey) -> Result<Option<Arc<OverlayLayer>>> {
        self.inner.get(key).await
    }

    async fn list(&self) -> Result<LayerSnapshot> {
        self.inner.list().await
    }

    async fn remove(&self, key: &LayerKey) -> Result<Option<Arc<OverlayLayer>>> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }

    async fn len(&self) -> Result<usize> {
        self.inner.len().await
    }

    async fn contains(&self, key: &LayerKey) -> Result<bool> {
        self.inner.contains(key).await
    }
}

/// Geocoder with canned answers
pub enum StubGeocoder {
    Found(GeocodeMatch),
    Empty,
    Down,
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Option<GeocodeMatch>> {
        match self {
            StubGeocoder::Found(place) => Ok(Some(place.clone())),
            StubGeocoder::Empty => Ok(None),
            StubGeocoder::Down => {
                Err(ZonescopeError::GeocodeUnavailable { reason: "connection refused".to_string() })
            }
        }
    }
}

pub fn zone_index(mode: IntersectionMode) -> ZoneIntersectionIndex {
    ZoneIntersectionIndex::new(ZoneDataset::from_geojson_str(ZONES).unwrap(), mode)
}

/// Session over a counting store with a small read chunk so rasters
/// report several progress events
pub fn session_with_store() -> (AnalysisSession, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let pipeline = FileIngestionPipeline::new(DecodeOptions::default(), 256);
    let session = AnalysisSession::new(Ok(zone_index(IntersectionMode::Touching)), store.clone(), pipeline);
    (session, store)
}
