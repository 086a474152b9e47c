pub mod category;
pub mod config;
pub mod error;
pub mod geo;
pub mod types;

pub use category::PoiCategory;
pub use config::WayfindConfig;
pub use error::{Result, WayfindError};
pub use types::*;
