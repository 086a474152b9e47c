//! Integration tests for the Wayfind API.
//!
//! Each test builds its own router over scripted completion, POI and
//! geocoding collaborators and drives it with `oneshot`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use wayfind_api::create_router;
use wayfind_api::handlers::{CategoriesResponse, ChatResponse, HealthResponse};
use wayfind_api::state::AppState;
use wayfind_chat::{ChatError, Completion, CompletionProvider, CompletionRequest};
use wayfind_core::{PoiRecord, WayfindConfig, APOLOGY};
use wayfind_poi::{PlaceInfo, PoiError, PoiSource, ReverseGeocoder};

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Completion, ChatError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<Completion, ChatError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ChatError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::UpstreamUnavailable("script exhausted".into())))
    }
}

#[derive(Default)]
struct StubPoi {
    records: Vec<PoiRecord>,
    fail: bool,
    calls: Mutex<Vec<(u32, String)>>,
}

#[async_trait]
impl PoiSource for StubPoi {
    async fn fetch_nearby(
        &self,
        _latitude: f64,
        _longitude: f64,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<PoiRecord>, PoiError> {
        self.calls
            .lock()
            .unwrap()
            .push((radius_meters, category.to_string()));
        if self.fail {
            return Err(PoiError::UpstreamUnavailable("Overpass status 504".into()));
        }
        Ok(self.records.clone())
    }
}

struct StubGeocoder {
    fail: bool,
}

#[async_trait]
impl ReverseGeocoder for StubGeocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<PlaceInfo, PoiError> {
        if self.fail {
            return Err(PoiError::Timeout(10));
        }
        Ok(PlaceInfo {
            city: "London".to_string(),
            state: "England".to_string(),
            country: "United Kingdom".to_string(),
            lat,
            lon,
        })
    }
}

fn poi(id: &str, name: &str, lat: f64, lon: f64) -> PoiRecord {
    PoiRecord {
        id: id.to_string(),
        latitude: lat,
        longitude: lon,
        name: Some(name.to_string()),
        category: "cafe".to_string(),
    }
}

fn make_app(provider: Arc<ScriptedProvider>, poi_source: Arc<StubPoi>) -> axum::Router {
    make_app_with(provider, poi_source, false, WayfindConfig::default())
}

fn make_app_with(
    provider: Arc<ScriptedProvider>,
    poi_source: Arc<StubPoi>,
    geocoder_fails: bool,
    config: WayfindConfig,
) -> axum::Router {
    let state = AppState::new(
        config,
        provider,
        poi_source,
        Arc::new(StubGeocoder {
            fail: geocoder_fails,
        }),
    );
    create_router(state)
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const CAFE_REQUEST: &str = r#"{
    "messages": [{"role": "user", "content": "any cafes around?"}],
    "location": {"lat": 51.5074, "lon": -0.1278, "city": "London"},
    "radius": 500
}"#;

// =============================================================================
// Health and vocabulary
// =============================================================================

#[tokio::test]
async fn test_health_happy_path() {
    let app = make_app(Arc::default(), Arc::default());
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert!(!health.started_at.is_empty());
}

#[tokio::test]
async fn test_categories() {
    let app = make_app(Arc::default(), Arc::default());
    let resp = app
        .oneshot(Request::get("/api/categories").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: CategoriesResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(body.categories.len(), 17);
    let attraction = body
        .categories
        .iter()
        .find(|c| c.value == "attraction")
        .unwrap();
    assert_eq!(attraction.tag, "tourism=attraction");
    let fast_food = body.categories.iter().find(|c| c.value == "fast_food").unwrap();
    assert_eq!(fast_food.tag_key, "amenity");
    assert_eq!(fast_food.spoken, "fast food");
    assert_eq!(body.examples.len(), 6);
}

// =============================================================================
// POST /api/chat
// =============================================================================

#[tokio::test]
async fn test_chat_direct_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(Completion::text(
        "Hi there! I can help you find nearby restaurants, cafes, and more.",
    ))]));
    let poi_source = Arc::new(StubPoi::default());
    let app = make_app(provider.clone(), poi_source.clone());

    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"messages":[{"role":"user","content":"hi"}],"location":{"lat":51.5,"lon":-0.12}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["role"], "assistant");
    assert_eq!(
        json["content"],
        "Hi there! I can help you find nearby restaurants, cafes, and more."
    );
    assert!(json.get("poi").is_none());
    assert!(poi_source.calls.lock().unwrap().is_empty());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_chat_tool_path_returns_poi() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(Completion::tool_call(
            "getNearbyPOIs",
            r#"{"latitude":51.5074,"longitude":-0.1278,"category":"cafe"}"#,
        )),
        Ok(Completion::text(
            "I found 2 cafes. Prufrock Coffee, about 300 m away. Monmouth Coffee, about 450 m away.",
        )),
    ]));
    let poi_source = Arc::new(StubPoi {
        records: vec![
            poi("node/1", "Prufrock Coffee", 51.5101, -0.1278),
            poi("node/2", "Monmouth Coffee", 51.5074, -0.1213),
            poi("node/3", "Prufrock Coffee", 51.5102, -0.1279),
        ],
        ..Default::default()
    });
    let app = make_app(provider.clone(), poi_source.clone());

    let resp = app.oneshot(post_json("/api/chat", CAFE_REQUEST)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: ChatResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert!(body.content.starts_with("I found 2 cafes."));
    assert_eq!(body.poi.len(), 2);
    assert_eq!(body.poi[0].id, "node/1");
    assert_eq!(body.poi[1].id, "node/2");
    assert_eq!(
        poi_source.calls.lock().unwrap().as_slice(),
        &[(500, "cafe".to_string())]
    );
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_chat_poi_failure_returns_apology() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(Completion::tool_call(
        "getNearbyPOIs",
        r#"{"category":"cafe"}"#,
    ))]));
    let poi_source = Arc::new(StubPoi {
        fail: true,
        ..Default::default()
    });
    let app = make_app(provider, poi_source);

    let resp = app.oneshot(post_json("/api/chat", CAFE_REQUEST)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["role"], "assistant");
    assert_eq!(json["content"], APOLOGY);
    assert_eq!(json["error"], "upstream_failure");
    assert!(!json.to_string().contains("504"));
}

#[tokio::test]
async fn test_chat_provider_failure_returns_apology() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(ChatError::Timeout(30))]));
    let app = make_app(provider, Arc::default());

    let resp = app.oneshot(post_json("/api/chat", CAFE_REQUEST)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["content"], APOLOGY);
}

#[tokio::test]
async fn test_chat_empty_messages_is_bad_request() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = make_app(provider.clone(), Arc::default());

    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"messages":[],"location":{"lat":51.5,"lon":-0.12}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "bad_request");
    assert_eq!(json["message"], "conversation cannot be empty");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_chat_invalid_inputs_are_bad_requests() {
    let cases = [
        r#"{"messages":[{"role":"user","content":"hi"}],"location":{"lat":95.0,"lon":0.0}}"#,
        r#"{"messages":[{"role":"user","content":"hi"}],"location":{"lat":51.5,"lon":-0.12},"radius":0}"#,
        r#"{"messages":[{"role":"user","content":"hi"}],"location":{"lat":51.5,"lon":-0.12},"radius":-10}"#,
        r#"{"messages":[{"role":"user","content":"   "}],"location":{"lat":51.5,"lon":-0.12}}"#,
        r#"{"messages":[{"role":"user","content":"hi"}]}"#,
        r#"{"messages":[{"role":"wizard","content":"hi"}],"location":{"lat":51.5,"lon":-0.12}}"#,
        "not json",
    ];

    for case in cases {
        let provider = Arc::new(ScriptedProvider::default());
        let app = make_app(provider.clone(), Arc::default());
        let resp = app.oneshot(post_json("/api/chat", case)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", case);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "bad_request", "body {}", case);
        assert_eq!(provider.request_count(), 0, "body {}", case);
    }
}

#[tokio::test]
async fn test_chat_radius_defaults_from_config() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(Completion::tool_call("getNearbyPOIs", r#"{"category":"museum"}"#)),
        Ok(Completion::text("I couldn't find any museums nearby.")),
    ]));
    let poi_source = Arc::new(StubPoi::default());
    let mut config = WayfindConfig::default();
    config.guide.default_radius_m = 1500;
    let app = make_app_with(provider, poi_source.clone(), false, config);

    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"messages":[{"role":"user","content":"museums?"}],"location":{"lat":51.5,"lon":-0.12}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        poi_source.calls.lock().unwrap().as_slice(),
        &[(1500, "museum".to_string())]
    );
}

// =============================================================================
// GET /api/geocode/reverse
// =============================================================================

#[tokio::test]
async fn test_reverse_geocode_happy_path() {
    let app = make_app(Arc::default(), Arc::default());
    let resp = app
        .oneshot(
            Request::get("/api/geocode/reverse?lat=51.5074&lon=-0.1278")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let place: PlaceInfo = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(place.city, "London");
    assert_eq!(place.lat, 51.5074);
}

#[tokio::test]
async fn test_reverse_geocode_failure_falls_back_to_unknown() {
    let app = make_app_with(
        Arc::default(),
        Arc::default(),
        true,
        WayfindConfig::default(),
    );
    let resp = app
        .oneshot(
            Request::get("/api/geocode/reverse?lat=19.15&lon=72.93")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let place: PlaceInfo = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(place.city, "Unknown");
    assert_eq!(place.state, "Unknown");
    assert_eq!(place.country, "Unknown");
    assert_eq!(place.lon, 72.93);
}

#[tokio::test]
async fn test_reverse_geocode_bad_params() {
    for uri in [
        "/api/geocode/reverse",
        "/api/geocode/reverse?lat=abc&lon=0",
        "/api/geocode/reverse?lat=91&lon=0",
    ] {
        let app = make_app(Arc::default(), Arc::default());
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
    }
}

// =============================================================================
// Middleware
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let mut config = WayfindConfig::default();
    config.server.rate_limit_per_sec = 2;
    let app = make_app_with(Arc::default(), Arc::default(), false, config);

    let mut statuses = Vec::new();
    for _ in 0..5 {
        let resp = app
            .clone()
            .oneshot(Request::get("/api/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();
        statuses.push(resp.status());
    }

    // A window boundary may fall inside the loop; at most two per window.
    let rejected = statuses
        .iter()
        .filter(|s| **s == StatusCode::TOO_MANY_REQUESTS)
        .count();
    assert!(rejected >= 1, "statuses {:?}", statuses);
}

#[tokio::test]
async fn test_health_not_rate_limited() {
    let mut config = WayfindConfig::default();
    config.server.rate_limit_per_sec = 1;
    let app = make_app_with(Arc::default(), Arc::default(), false, config);

    for _ in 0..5 {
        let resp = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = make_app(Arc::default(), Arc::default());
    let resp = app
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
