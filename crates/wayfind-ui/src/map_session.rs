//! Map widget state: the user's marker, the search radius circle, POI
//! markers and an optional route to one of them.
//!
//! One `MapSession` per map view; every change goes through an explicit
//! update method so the renderer only has to diff this struct.

use serde::Serialize;
use tracing::debug;

use wayfind_core::geo::{format_distance, haversine_meters};
use wayfind_core::PoiRecord;

/// Initial view when the platform cannot report a position (central London).
pub const DEFAULT_CENTER: (f64, f64) = (51.505, -0.09);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lon: f64,
}

/// Search radius drawn around the user marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiusCircle {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: u32,
}

/// Straight-line leg from the user to a selected marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub marker_id: String,
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub distance_m: f64,
    /// Spoken form, e.g. `350 m`.
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSession {
    user: (f64, f64),
    circle: RadiusCircle,
    markers: Vec<MapMarker>,
    route: Option<Route>,
}

impl MapSession {
    pub fn new(lat: f64, lon: f64, radius_m: u32) -> Self {
        Self {
            user: (lat, lon),
            circle: RadiusCircle {
                lat,
                lon,
                radius_m,
            },
            markers: Vec::new(),
            route: None,
        }
    }

    /// Session centered on [`DEFAULT_CENTER`].
    pub fn at_default(radius_m: u32) -> Self {
        Self::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1, radius_m)
    }

    pub fn user_position(&self) -> (f64, f64) {
        self.user
    }

    pub fn circle(&self) -> RadiusCircle {
        self.circle
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Move the user marker (drag or map click). The circle follows and
    /// any route is dropped since its origin changed.
    pub fn move_user(&mut self, lat: f64, lon: f64) {
        debug!(lat, lon, "User marker moved");
        self.user = (lat, lon);
        self.circle.lat = lat;
        self.circle.lon = lon;
        self.route = None;
    }

    pub fn set_radius(&mut self, radius_m: u32) {
        self.circle.radius_m = radius_m;
    }

    /// Replace POI markers with the records from an answer.
    ///
    /// Records without a name or category get no marker. A route whose
    /// target is no longer shown is dropped.
    pub fn show_poi(&mut self, records: &[PoiRecord]) {
        self.markers = records
            .iter()
            .filter_map(|r| {
                let name = r.display_name()?;
                let category = r.category.trim();
                if category.is_empty() {
                    return None;
                }
                Some(MapMarker {
                    id: r.id.clone(),
                    name: name.to_string(),
                    category: category.to_string(),
                    lat: r.latitude,
                    lon: r.longitude,
                })
            })
            .collect();

        if let Some(route) = &self.route {
            if !self.markers.iter().any(|m| m.id == route.marker_id) {
                self.route = None;
            }
        }
    }

    /// Route to the marker with `id`. Returns `None` for unknown ids.
    pub fn select_marker(&mut self, id: &str) -> Option<&Route> {
        let marker = self.markers.iter().find(|m| m.id == id)?;
        let distance_m = haversine_meters(self.user.0, self.user.1, marker.lat, marker.lon);
        self.route = Some(Route {
            marker_id: marker.id.clone(),
            from: self.user,
            to: (marker.lat, marker.lon),
            distance_m,
            distance: format_distance(distance_m),
        });
        self.route.as_ref()
    }

    pub fn clear_route(&mut self) {
        self.route = None;
    }
}
