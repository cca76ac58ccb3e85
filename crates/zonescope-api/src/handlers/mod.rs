mod analysis;
mod health;
mod layers;
mod search;
mod status;
mod zones;

pub use analysis::{analyze, dismiss_analysis, get_analysis, send_analysis};
pub use health::health_check;
pub use layers::{get_layer, list_layers, remove_layer, upload_layer};
pub use search::search;
pub use status::session_status;
pub use zones::list_zones;
