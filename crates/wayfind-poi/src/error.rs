//! Error types for the map-data services.

use wayfind_core::error::WayfindError;

/// Errors from an outbound map-data call.
#[derive(Debug, thiserror::Error)]
pub enum PoiError {
    /// Non-success status or transport failure.
    #[error("map service unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The payload could not be parsed into the expected shape.
    #[error("malformed map service response: {0}")]
    MalformedResponse(String),
    #[error("map service timed out after {0}s")]
    Timeout(u64),
}

impl PoiError {
    /// Classify a transport-level `reqwest` failure.
    pub fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            PoiError::Timeout(timeout_secs)
        } else if err.is_decode() {
            PoiError::MalformedResponse(err.to_string())
        } else {
            PoiError::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<PoiError> for WayfindError {
    fn from(err: PoiError) -> Self {
        WayfindError::Poi(err.to_string())
    }
}
