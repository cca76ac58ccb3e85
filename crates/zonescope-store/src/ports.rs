use async_trait::async_trait;
use std::sync::Arc;
use zonescope_core::models::{LayerKey, OverlayLayer};
use zonescope_core::Result;

/// Port for the overlay layers shown on the map
///
/// Keys are unique. Adding under an existing key replaces the layer and
/// keeps the key's position in enumeration order.
#[async_trait]
pub trait OverlayStore: Send + Sync {
    /// Insert or replace the layer stored under `key`
    async fn add(&self, key: LayerKey, layer: OverlayLayer) -> Result<()>;

    /// Get the layer stored under `key`
    async fn get(&self, key: &LayerKey) -> Result<Option<Arc<OverlayLayer>>>;

    /// Snapshot of all entries in insertion order
    async fn list(&self) -> Result<LayerSnapshot>;

    /// Remove the entry under `key`, returning it if it existed
    async fn remove(&self, key: &LayerKey) -> Result<Option<Arc<OverlayLayer>>>;

    /// Number of stored layers
    async fn len(&self) -> Result<usize>;

    async fn contains(&self, key: &LayerKey) -> Result<bool>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Point-in-time copy of the store's entries
///
/// Later writes to the store are not visible here. Iteration can be
/// restarted any number of times.
#[derive(Debug, Clone, Default)]
pub struct LayerSnapshot {
    entries: Vec<(LayerKey, Arc<OverlayLayer>)>,
}

impl LayerSnapshot {
    pub fn new(entries: Vec<(LayerKey, Arc<OverlayLayer>)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LayerKey, &Arc<OverlayLayer>)> {
        self.entries.iter().map(|(key, layer)| (key, layer))
    }

    pub fn keys(&self) -> impl Iterator<Item = &LayerKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for LayerSnapshot {
    type Item = (LayerKey, Arc<OverlayLayer>);
    type IntoIter = std::vec::IntoIter<(LayerKey, Arc<OverlayLayer>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
