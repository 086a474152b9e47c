//! Overpass API client: single-category radius search.
//!
//! One query per call, no retry. The requested category value is matched
//! exactly against the `amenity`, `tourism`, `leisure` and `shop` tag keys;
//! whichever key matched, the record's `category` is the requested value.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use wayfind_core::config::PoiConfig;
use wayfind_core::PoiRecord;

use crate::error::PoiError;

/// Tag keys searched for the requested category value, in priority order.
pub const TAG_NAMESPACES: [&str; 4] = ["amenity", "tourism", "leisure", "shop"];

/// A source of nearby points of interest.
#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Fetch entities within `radius_meters` of the point whose tags carry
    /// `category` as a value.
    async fn fetch_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<PoiRecord>, PoiError>;
}

/// HTTP client for an Overpass interpreter endpoint.
pub struct OverpassClient {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl OverpassClient {
    /// Build a client from the `[poi]` configuration section.
    pub fn new(config: &PoiConfig) -> Result<Self, PoiError> {
        Self::with_endpoint(&config.overpass_url, &config.user_agent, config.timeout())
    }

    pub fn with_endpoint(
        endpoint: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, PoiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                PoiError::UpstreamUnavailable(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            timeout_secs: timeout.as_secs().max(1),
        })
    }
}

#[async_trait]
impl PoiSource for OverpassClient {
    async fn fetch_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<PoiRecord>, PoiError> {
        let query = build_query(latitude, longitude, radius_meters, category, self.timeout_secs);
        info!(
            category,
            radius_meters,
            endpoint = %self.endpoint,
            "Querying Overpass"
        );
        debug!(query = %query, "Overpass QL");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "text/plain")
            .body(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Overpass request failed");
                PoiError::from_transport(&e, self.timeout_secs)
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| PoiError::from_transport(&e, self.timeout_secs))?;

        if !status.is_success() {
            error!(status = %status, "Overpass returned an error status");
            return Err(PoiError::UpstreamUnavailable(format!(
                "Overpass status {}",
                status.as_u16()
            )));
        }

        let records = parse_response(&text, category)?;
        info!(count = records.len(), category, "Overpass results parsed");
        Ok(records)
    }
}

// =============================================================================
// Query construction
// =============================================================================

/// Build the Overpass QL query for one category around a point.
pub fn build_query(
    latitude: f64,
    longitude: f64,
    radius_meters: u32,
    category: &str,
    timeout_secs: u64,
) -> String {
    let value = escape_ql(category);
    let mut q = format!("[out:json][timeout:{}];\n(\n", timeout_secs);
    for key in TAG_NAMESPACES {
        q.push_str(&format!(
            "  nwr(around:{},{:.7},{:.7})[\"{}\"=\"{}\"];\n",
            radius_meters, latitude, longitude, key, value
        ));
    }
    q.push_str(");\nout center;");
    q
}

/// Escape a value for use inside a double-quoted Overpass QL string.
fn escape_ql(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' | '\r' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

// =============================================================================
// Response parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    /// Node coordinates, or the computed center for ways and relations.
    fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(c)) => Some((c.lat, c.lon)),
            _ => None,
        }
    }

    /// The first tag namespace whose value equals `category`.
    fn matched_namespace(&self, category: &str) -> Option<&'static str> {
        TAG_NAMESPACES
            .iter()
            .copied()
            .find(|key| self.tags.get(*key).map(String::as_str) == Some(category))
    }
}

/// Parse an Overpass JSON payload into records carrying `category`.
///
/// Elements without coordinates or without the requested tag value are
/// dropped. Unnamed elements are kept; display filtering happens later.
pub fn parse_response(body: &str, category: &str) -> Result<Vec<PoiRecord>, PoiError> {
    let parsed: OverpassResponse = serde_json::from_str(body)
        .map_err(|e| PoiError::MalformedResponse(format!("unexpected Overpass payload: {}", e)))?;

    let mut records = Vec::with_capacity(parsed.elements.len());
    for element in parsed.elements {
        let Some(namespace) = element.matched_namespace(category) else {
            debug!(id = element.id, "Skipping element without requested tag");
            continue;
        };
        let Some((latitude, longitude)) = element.coordinates() else {
            debug!(id = element.id, "Skipping element without coordinates");
            continue;
        };
        debug!(id = element.id, namespace, "Matched element");
        records.push(PoiRecord {
            id: format!("{}/{}", element.kind, element.id),
            latitude,
            longitude,
            name: element.tags.get("name").cloned(),
            category: category.to_string(),
        });
    }
    Ok(records)
}

// =============================================================================
// Tests
// =============================================================================
