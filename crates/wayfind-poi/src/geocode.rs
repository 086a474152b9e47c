//! Reverse geocoding through Nominatim.
//!
//! Turns the caller's coordinates into a city / state / country label for
//! the location chip and the routing prompt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use wayfind_core::config::PoiConfig;

use crate::error::PoiError;

const UNKNOWN: &str = "Unknown";

/// Place names for a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl PlaceInfo {
    /// Placeholder used when the lookup fails.
    pub fn unknown(lat: f64, lon: f64) -> Self {
        Self {
            city: UNKNOWN.to_string(),
            state: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            lat,
            lon,
        }
    }

    /// `City, State, Country`, as shown after a location change.
    pub fn label(&self) -> String {
        format!("{}, {}, {}", self.city, self.state, self.country)
    }
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<PlaceInfo, PoiError>;
}

/// HTTP client for a Nominatim instance.
pub struct NominatimClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl NominatimClient {
    pub fn new(config: &PoiConfig) -> Result<Self, PoiError> {
        Self::with_base_url(&config.nominatim_url, &config.user_agent, config.timeout())
    }

    pub fn with_base_url(
        base_url: &str,
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
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs().max(1),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<PlaceInfo, PoiError> {
        let url = format!("{}/reverse", self.base_url);
        info!(lat, lon, "Reverse geocoding");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Nominatim request failed");
                PoiError::from_transport(&e, self.timeout_secs)
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| PoiError::from_transport(&e, self.timeout_secs))?;
        if !status.is_success() {
            return Err(PoiError::UpstreamUnavailable(format!(
                "Nominatim status {}",
                status.as_u16()
            )));
        }

        parse_reverse(&text, lat, lon)
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

/// Parse a Nominatim `reverse` payload, preferring the most specific
/// settlement name available.
pub fn parse_reverse(body: &str, lat: f64, lon: f64) -> Result<PlaceInfo, PoiError> {
    let parsed: ReverseResponse = serde_json::from_str(body)
        .map_err(|e| PoiError::MalformedResponse(format!("unexpected Nominatim payload: {}", e)))?;
    let a = parsed.address;

    let city = a.city.or(a.town).or(a.village).or(a.hamlet);
    let state = a.state.or(a.county);

    Ok(PlaceInfo {
        city: city.unwrap_or_else(|| UNKNOWN.to_string()),
        state: state.unwrap_or_else(|| UNKNOWN.to_string()),
        country: a.country.unwrap_or_else(|| UNKNOWN.to_string()),
        lat,
        lon,
    })
}
