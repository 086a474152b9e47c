//! Recognized POI category vocabulary.
//!
//! Each category is a canonical OpenStreetMap tag value under one tag key.
//! Free-text phrasing is mapped onto this vocabulary by the routing prompt;
//! this module only does exact (normalized) lookups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// OpenStreetMap tag key a category value lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKey {
    Amenity,
    Tourism,
}

impl TagKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKey::Amenity => "amenity",
            TagKey::Tourism => "tourism",
        }
    }
}

/// A canonical category the POI search understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Restaurant,
    FastFood,
    Cafe,
    Pub,
    IceCream,
    FoodCourt,
    Parking,
    Bank,
    Pharmacy,
    BusStation,
    BicycleRental,
    Attraction,
    Museum,
    Viewpoint,
    Zoo,
    ThemePark,
    Artwork,
}

impl PoiCategory {
    /// Every category, in the order presented to the model.
    pub const ALL: [PoiCategory; 17] = [
        PoiCategory::Restaurant,
        PoiCategory::FastFood,
        PoiCategory::Cafe,
        PoiCategory::Pub,
        PoiCategory::IceCream,
        PoiCategory::FoodCourt,
        PoiCategory::Parking,
        PoiCategory::Bank,
        PoiCategory::Pharmacy,
        PoiCategory::BusStation,
        PoiCategory::BicycleRental,
        PoiCategory::Attraction,
        PoiCategory::Museum,
        PoiCategory::Viewpoint,
        PoiCategory::Zoo,
        PoiCategory::ThemePark,
        PoiCategory::Artwork,
    ];

    /// Categories suggested to the user when a search comes back empty or a
    /// request is too vague.
    pub const EXAMPLES: [PoiCategory; 6] = [
        PoiCategory::Restaurant,
        PoiCategory::Cafe,
        PoiCategory::Pub,
        PoiCategory::FastFood,
        PoiCategory::Museum,
        PoiCategory::Attraction,
    ];

    /// Canonical tag value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PoiCategory::Restaurant => "restaurant",
            PoiCategory::FastFood => "fast_food",
            PoiCategory::Cafe => "cafe",
            PoiCategory::Pub => "pub",
            PoiCategory::IceCream => "ice_cream",
            PoiCategory::FoodCourt => "food_court",
            PoiCategory::Parking => "parking",
            PoiCategory::Bank => "bank",
            PoiCategory::Pharmacy => "pharmacy",
            PoiCategory::BusStation => "bus_station",
            PoiCategory::BicycleRental => "bicycle_rental",
            PoiCategory::Attraction => "attraction",
            PoiCategory::Museum => "museum",
            PoiCategory::Viewpoint => "viewpoint",
            PoiCategory::Zoo => "zoo",
            PoiCategory::ThemePark => "theme_park",
            PoiCategory::Artwork => "artwork",
        }
    }

    pub fn tag_key(&self) -> TagKey {
        match self {
            PoiCategory::Attraction
            | PoiCategory::Museum
            | PoiCategory::Viewpoint
            | PoiCategory::Zoo
            | PoiCategory::ThemePark
            | PoiCategory::Artwork => TagKey::Tourism,
            _ => TagKey::Amenity,
        }
    }

    /// Spoken form, e.g. `fast food` for `fast_food`.
    pub fn spoken(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// `key=value` form, e.g. `tourism=attraction`.
    pub fn canonical_tag(&self) -> String {
        format!("{}={}", self.tag_key().as_str(), self.as_str())
    }

    /// Look up a category from loosely formatted model output.
    ///
    /// Trims, lowercases, maps spaces and hyphens to underscores and strips an
    /// optional `key=` prefix. Returns `None` for empty or unknown values.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut value = raw.trim().to_ascii_lowercase();
        if let Some((_, v)) = value.split_once('=') {
            value = v.trim().to_string();
        }
        let value = value.replace([' ', '-'], "_");
        if value.is_empty() {
            return None;
        }
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }

    /// Comma-separated spoken list of the example categories.
    pub fn example_list() -> String {
        let spoken: Vec<String> = Self::EXAMPLES.iter().map(|c| c.spoken()).collect();
        spoken.join(", ")
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for [`PoiCategory::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for PoiCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
