//! Zonescope Store - Overlay storage port and adapters
//!
//! This crate defines the overlay storage port and provides the in-memory
//! registry the session renders from.

pub mod memory;
pub mod ports;

pub use memory::OverlayRegistry;
pub use ports::{LayerSnapshot, OverlayStore};
