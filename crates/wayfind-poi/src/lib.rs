//! Nearby point-of-interest search and reverse geocoding.
//!
//! Wraps the public OpenStreetMap services: Overpass for tag-filtered
//! radius searches and Nominatim for coordinate-to-place lookups. Results
//! are normalized into flat [`wayfind_core::PoiRecord`]s.

pub mod error;
pub mod geocode;
pub mod normalize;
pub mod overpass;

pub use error::PoiError;
pub use geocode::{NominatimClient, PlaceInfo, ReverseGeocoder};
pub use normalize::normalize_for_display;
pub use overpass::{OverpassClient, PoiSource};
