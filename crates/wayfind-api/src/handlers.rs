//! Route handler functions for all API endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use wayfind_core::{ConversationTurn, PoiCategory, PoiRecord, Role, UserLocation};
use wayfind_poi::PlaceInfo;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Caller position as sent by the map widget.
#[derive(Debug, Deserialize)]
pub struct LocationPayload {
    pub lat: f64,
    pub lon: f64,
    /// Place label from reverse geocoding, e.g. `London`.
    pub city: Option<String>,
}

/// Body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ConversationTurn>,
    pub location: LocationPayload,
    /// Search radius in meters; the configured default when absent.
    pub radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poi: Vec<PoiRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub started_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Canonical tag value, e.g. `fast_food`.
    pub value: String,
    pub tag_key: String,
    /// `key=value` form.
    pub tag: String,
    pub spoken: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
    /// Suggested when a search is empty or too vague.
    pub examples: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Resolve the requested radius against configured bounds.
fn resolve_radius(radius: Option<f64>, default_m: u32) -> Result<u32, ApiError> {
    match radius {
        None => Ok(default_m),
        Some(r) if r.is_finite() && r >= 1.0 => Ok(r.round().min(u32::MAX as f64) as u32),
        Some(_) => Err(ApiError::BadRequest(
            "'radius' must be a positive number of meters".to_string(),
        )),
    }
}

/// POST /api/chat - answer one conversational turn.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let radius = resolve_radius(req.radius, state.config.guide.default_radius_m)?;
    let mut location = UserLocation::new(req.location.lat, req.location.lon);
    if let Some(city) = req.location.city.filter(|c| !c.trim().is_empty()) {
        location = location.with_label(city);
    }

    let answer = state
        .orchestrator
        .handle(&req.messages, &location, radius)
        .await?;

    Ok(Json(ChatResponse {
        role: answer.role,
        content: answer.content,
        poi: answer.poi,
    }))
}

/// GET /api/geocode/reverse - place names for a coordinate.
///
/// Upstream failures degrade to `Unknown` fields rather than an error.
pub async fn reverse_geocode(
    State(state): State<AppState>,
    params: Result<Query<ReverseParams>, QueryRejection>,
) -> Result<Json<PlaceInfo>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if !UserLocation::new(params.lat, params.lon).is_valid() {
        return Err(ApiError::BadRequest(
            "'lat' and 'lon' must be valid WGS84 coordinates".to_string(),
        ));
    }

    match state.geocoder.reverse(params.lat, params.lon).await {
        Ok(place) => Ok(Json(place)),
        Err(e) => {
            tracing::warn!(error = %e, lat = params.lat, lon = params.lon, "Reverse geocoding failed");
            Ok(Json(PlaceInfo::unknown(params.lat, params.lon)))
        }
    }
}

/// GET /api/categories - the POI category vocabulary.
pub async fn categories() -> Json<CategoriesResponse> {
    let categories = PoiCategory::ALL
        .iter()
        .map(|c| CategoryInfo {
            value: c.as_str().to_string(),
            tag_key: c.tag_key().as_str().to_string(),
            tag: c.canonical_tag(),
            spoken: c.spoken(),
        })
        .collect();
    let examples = PoiCategory::EXAMPLES
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();

    Json(CategoriesResponse {
        categories,
        examples,
    })
}

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
    })
}
