//! Port trait definitions
//!
//! These traits define the external collaborators the engine talks to;
//! adapters live in the API crate.

pub mod geocoder;
pub mod sink;

pub use geocoder::{GeocodeMatch, Geocoder};
pub use sink::ResultSink;
