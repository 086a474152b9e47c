//! The single tool exposed to the model.

use serde_json::{json, Value};

use wayfind_core::PoiCategory;

pub const POI_TOOL_NAME: &str = "getNearbyPOIs";

/// Function definition for `getNearbyPOIs`.
///
/// `category` is enumerated from the vocabulary so well-behaved models stay
/// inside it; the parser still validates whatever comes back.
pub fn poi_tool_definition(default_radius_m: u32) -> Value {
    let categories: Vec<&str> = PoiCategory::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "function",
        "function": {
            "name": POI_TOOL_NAME,
            "description": "Find points of interest of one category near the user's current location.",
            "parameters": {
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "Latitude of the search center"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "Longitude of the search center"
                    },
                    "category": {
                        "type": "string",
                        "enum": categories,
                        "description": "OpenStreetMap tag value of the place type, e.g. cafe or attraction"
                    },
                    "radius": {
                        "type": "number",
                        "description": "Search radius in meters",
                        "default": default_radius_m
                    },
                    "keyword": {
                        "type": "string",
                        "description": "Optional refinement such as a cuisine or name fragment"
                    }
                },
                "required": ["category"]
            }
        }
    })
}
