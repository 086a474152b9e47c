//! Validation of `getNearbyPOIs` tool arguments.
//!
//! The model's argument payload is untyped JSON. It becomes either a
//! [`PoiQuery`] or a reason the request needs clarification; only a payload
//! that is not a JSON object at all is an error.

use std::fmt;

use serde_json::{Map, Value};

use wayfind_core::{PoiCategory, PoiQuery, UserLocation};

use crate::error::ChatError;

/// Why a well-formed payload could not become a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    MissingCategory,
    UnknownCategory(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingCategory => write!(f, "category missing or empty"),
            InvalidReason::UnknownCategory(raw) => write!(f, "unknown category '{}'", raw),
        }
    }
}

/// Outcome of validating a tool-call payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    Valid(PoiQuery),
    Invalid(InvalidReason),
}

/// Validate raw tool arguments against the caller's request.
///
/// Coordinates always come from `location`; any the model supplied are
/// ignored. `radius` accepts a number or a numeric string, falls back to
/// `default_radius` when absent or non-positive and is clamped to
/// `max_radius`. A blank payload is treated as `{}`.
pub fn parse_tool_arguments(
    raw: &str,
    location: &UserLocation,
    default_radius: u32,
    max_radius: u32,
) -> Result<ToolArguments, ChatError> {
    let raw = raw.trim();
    let value: Value = if raw.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(raw)
            .map_err(|e| ChatError::MalformedToolArguments(format!("invalid JSON: {}", e)))?
    };

    let Value::Object(args) = value else {
        return Err(ChatError::MalformedToolArguments(
            "expected a JSON object".to_string(),
        ));
    };

    let category = match args.get("category") {
        None | Some(Value::Null) => return Ok(ToolArguments::Invalid(InvalidReason::MissingCategory)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Ok(ToolArguments::Invalid(InvalidReason::MissingCategory))
        }
        Some(Value::String(s)) => match PoiCategory::parse(s) {
            Some(category) => category,
            None => {
                return Ok(ToolArguments::Invalid(InvalidReason::UnknownCategory(
                    s.trim().to_string(),
                )))
            }
        },
        Some(other) => {
            return Ok(ToolArguments::Invalid(InvalidReason::UnknownCategory(
                other.to_string(),
            )))
        }
    };

    let radius = radius_meters(args.get("radius"))
        .unwrap_or(default_radius)
        .min(max_radius);

    let keyword = args
        .get("keyword")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);

    Ok(ToolArguments::Valid(PoiQuery {
        latitude: location.latitude,
        longitude: location.longitude,
        radius_meters: radius,
        category,
        keyword,
    }))
}

/// Positive whole meters from a number or numeric string.
fn radius_meters(value: Option<&Value>) -> Option<u32> {
    let meters = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !meters.is_finite() || meters < 1.0 {
        return None;
    }
    Some(meters.round().min(u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> UserLocation {
        UserLocation::new(51.5074, -0.1278)
    }

    fn parse(raw: &str) -> Result<ToolArguments, ChatError> {
        parse_tool_arguments(raw, &london(), 1000, 5000)
    }

    fn valid(raw: &str) -> PoiQuery {
        match parse(raw).unwrap() {
            ToolArguments::Valid(q) => q,
            other => panic!("expected valid arguments, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_category_uses_caller_coordinates() {
        let q = valid(r#"{"latitude": 10.0, "longitude": 20.0, "category": "cafe", "radius": 500}"#);
        assert_eq!(q.category, PoiCategory::Cafe);
        assert_eq!(q.radius_meters, 500);
        assert_eq!(q.latitude, 51.5074);
        assert_eq!(q.longitude, -0.1278);
        assert!(q.keyword.is_none());
    }

    #[test]
    fn test_category_normalization() {
        assert_eq!(valid(r#"{"category": "tourism=attraction"}"#).category, PoiCategory::Attraction);
        assert_eq!(valid(r#"{"category": " Fast Food "}"#).category, PoiCategory::FastFood);
        assert_eq!(valid(r#"{"category": "ice-cream"}"#).category, PoiCategory::IceCream);
        assert_eq!(valid(r#"{"category": "MUSEUM"}"#).category, PoiCategory::Museum);
    }

    #[test]
    fn test_missing_or_empty_category() {
        for raw in [
            r#"{}"#,
            r#"{"category": null}"#,
            r#"{"category": ""}"#,
            r#"{"category": "   "}"#,
            "",
            "  ",
        ] {
            assert_eq!(
                parse(raw).unwrap(),
                ToolArguments::Invalid(InvalidReason::MissingCategory),
                "payload {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_unknown_category() {
        assert_eq!(
            parse(r#"{"category": "nightclub"}"#).unwrap(),
            ToolArguments::Invalid(InvalidReason::UnknownCategory("nightclub".to_string()))
        );
        assert!(matches!(
            parse(r#"{"category": 42}"#).unwrap(),
            ToolArguments::Invalid(InvalidReason::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_radius_defaults_and_clamps() {
        assert_eq!(valid(r#"{"category": "cafe"}"#).radius_meters, 1000);
        assert_eq!(valid(r#"{"category": "cafe", "radius": "750"}"#).radius_meters, 750);
        assert_eq!(valid(r#"{"category": "cafe", "radius": 250.4}"#).radius_meters, 250);
        assert_eq!(valid(r#"{"category": "cafe", "radius": 0}"#).radius_meters, 1000);
        assert_eq!(valid(r#"{"category": "cafe", "radius": -50}"#).radius_meters, 1000);
        assert_eq!(valid(r#"{"category": "cafe", "radius": "far"}"#).radius_meters, 1000);
        assert_eq!(valid(r#"{"category": "cafe", "radius": 20000}"#).radius_meters, 5000);
    }

    #[test]
    fn test_default_radius_is_clamped_too() {
        let args = parse_tool_arguments(r#"{"category": "pub"}"#, &london(), 8000, 5000).unwrap();
        let ToolArguments::Valid(q) = args else {
            panic!("expected valid arguments");
        };
        assert_eq!(q.radius_meters, 5000);
    }

    #[test]
    fn test_keyword() {
        assert_eq!(
            valid(r#"{"category": "restaurant", "keyword": " thai "}"#).keyword.as_deref(),
            Some("thai")
        );
        assert!(valid(r#"{"category": "restaurant", "keyword": ""}"#).keyword.is_none());
        assert!(valid(r#"{"category": "restaurant", "keyword": 3}"#).keyword.is_none());
    }

    #[test]
    fn test_malformed_payloads() {
        for raw in ["not json", "[1, 2]", "\"cafe\"", "42", "null"] {
            let err = parse(raw).unwrap_err();
            assert!(
                matches!(err, ChatError::MalformedToolArguments(_)),
                "payload {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_invalid_reason_display() {
        assert_eq!(
            InvalidReason::MissingCategory.to_string(),
            "category missing or empty"
        );
        assert_eq!(
            InvalidReason::UnknownCategory("spa".to_string()).to_string(),
            "unknown category 'spa'"
        );
    }
}
