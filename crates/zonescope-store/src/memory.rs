//! In-memory overlay registry
//!
//! A poisoned lock only means another thread panicked mid-read or mid-write.
//! Every write below leaves the entries consistent before it can panic, so
//! the guard is recovered instead of propagating the poison.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use zonescope_core::models::{LayerKey, OverlayLayer};
use zonescope_core::Result;

use crate::ports::{LayerSnapshot, OverlayStore};

#[derive(Debug, Default)]
struct RegistryInner {
    entries: Vec<(LayerKey, Arc<OverlayLayer>)>,
    positions: HashMap<LayerKey, usize>,
}

/// Insertion-ordered overlay registry shared across tasks
#[derive(Debug, Clone, Default)]
pub struct OverlayRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl OverlayStore for OverlayRegistry {
    async fn add(&self, key: LayerKey, layer: OverlayLayer) -> Result<()> {
        let layer = Arc::new(layer);
        let mut inner = self.write();

        match inner.positions.get(&key).copied() {
            Some(position) => {
                tracing::debug!(key = %key, "Replacing overlay layer");
                inner.entries[position].1 = layer;
            }
            None => {
                tracing::debug!(key = %key, kind = ?layer.kind(), "Adding overlay layer");
                let position = inner.entries.len();
                inner.positions.insert(key.clone(), position);
                inner.entries.push((key, layer));
            }
        }
        Ok(())
    }

    async fn get(&self, key: &LayerKey) -> Result<Option<Arc<OverlayLayer>>> {
        let inner = self.read();
        Ok(inner.positions.get(key).map(|&position| Arc::clone(&inner.entries[position].1)))
    }

    async fn list(&self) -> Result<LayerSnapshot> {
        Ok(LayerSnapshot::new(self.read().entries.clone()))
    }

    async fn remove(&self, key: &LayerKey) -> Result<Option<Arc<OverlayLayer>>> {
        let mut inner = self.write();

        let Some(position) = inner.positions.remove(key) else {
            return Ok(None);
        };
        let (_, layer) = inner.entries.remove(position);

        // Shift the positions of everything after the removed entry
        let RegistryInner { entries, positions } = &mut *inner;
        for (index, (key, _)) in entries.iter().enumerate().skip(position) {
            positions.insert(key.clone(), index);
        }

        tracing::debug!(key = %key, "Removed overlay layer");
        Ok(Some(layer))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.read().entries.len())
    }

    async fn contains(&self, key: &LayerKey) -> Result<bool> {
        Ok(self.read().positions.contains_key(key))
    }
}
