//! Application state shared across all route handlers.
//!
//! Everything here is read-only after startup; requests carry their own
//! conversation and location.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use wayfind_chat::{CompletionProvider, GuideOrchestrator, OpenAiCompatibleClient};
use wayfind_core::{WayfindConfig, WayfindError};
use wayfind_poi::{NominatimClient, OverpassClient, PoiSource, ReverseGeocoder};

/// Shared application state. All fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WayfindConfig>,
    pub orchestrator: Arc<GuideOrchestrator>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Assemble state from already-built collaborators.
    pub fn new(
        config: WayfindConfig,
        provider: Arc<dyn CompletionProvider>,
        poi_source: Arc<dyn PoiSource>,
        geocoder: Arc<dyn ReverseGeocoder>,
    ) -> Self {
        let orchestrator = GuideOrchestrator::new(provider, poi_source, config.guide.clone());
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            geocoder,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Build the HTTP clients named by the configuration.
    pub fn from_config(config: WayfindConfig) -> Result<Self, WayfindError> {
        if config.llm.api_key().is_none() {
            tracing::warn!(
                env = %config.llm.api_key_env,
                "No completion API key set; requests will be sent unauthenticated"
            );
        }
        let provider = Arc::new(OpenAiCompatibleClient::new(&config.llm)?);
        let poi_source = Arc::new(OverpassClient::new(&config.poi)?);
        let geocoder = Arc::new(NominatimClient::new(&config.poi)?);
        Ok(Self::new(config, provider, poi_source, geocoder))
    }
}
