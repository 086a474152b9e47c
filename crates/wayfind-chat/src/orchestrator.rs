//! Guide orchestrator: sequences routing, fetching and composing for one
//! request.
//!
//! The orchestrator holds no per-request state and is shared behind an
//! `Arc`. Each request gets its own [`GuideRun`] and a `guide_request`
//! tracing span carrying a fresh request id.

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use wayfind_core::config::GuideConfig;
use wayfind_core::{ConversationTurn, GuideAnswer, UserLocation, APOLOGY};
use wayfind_poi::{normalize_for_display, PoiSource};

use crate::composer::AnswerComposer;
use crate::error::{ChatError, RequestError};
use crate::llm::CompletionProvider;
use crate::router::{IntentRouter, RouteOutcome};
use crate::state::{GuideRun, GuideState};

/// Maximum length of one turn in characters.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Maximum number of turns accepted per request.
const MAX_TURNS: usize = 100;

/// Terminal result of one request.
#[derive(Debug)]
pub enum Resolution {
    Answered(GuideAnswer),
    Failed(RequestError),
}

impl Resolution {
    pub fn state(&self) -> GuideState {
        match self {
            Resolution::Answered(_) => GuideState::Answered,
            Resolution::Failed(_) => GuideState::Failed,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match self {
            Resolution::Answered(_) => None,
            Resolution::Failed(e) => Some(e),
        }
    }

    /// The answer to show the user: the real one, or the apology.
    pub fn into_answer(self) -> GuideAnswer {
        match self {
            Resolution::Answered(answer) => answer,
            Resolution::Failed(_) => GuideAnswer::text(APOLOGY),
        }
    }
}

pub struct GuideOrchestrator {
    router: IntentRouter,
    composer: AnswerComposer,
    poi_source: Arc<dyn PoiSource>,
    config: GuideConfig,
}

impl GuideOrchestrator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        poi_source: Arc<dyn PoiSource>,
        config: GuideConfig,
    ) -> Self {
        Self {
            router: IntentRouter::new(
                Arc::clone(&provider),
                config.assistant_name.clone(),
                config.max_radius_m,
            ),
            composer: AnswerComposer::new(provider, config.assistant_name.clone()),
            poi_source,
            config,
        }
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    /// Check caller input and return the effective search radius.
    pub fn validate(
        &self,
        conversation: &[ConversationTurn],
        location: &UserLocation,
        radius_meters: u32,
    ) -> Result<u32, ChatError> {
        let last = conversation.last().ok_or(ChatError::EmptyConversation)?;
        if conversation.len() > MAX_TURNS {
            return Err(ChatError::TooManyTurns(MAX_TURNS));
        }
        if conversation
            .iter()
            .any(|t| t.content.chars().count() > MAX_MESSAGE_LENGTH)
        {
            return Err(ChatError::MessageTooLong(MAX_MESSAGE_LENGTH));
        }
        if last.content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if !location.is_valid() {
            return Err(ChatError::InvalidLocation {
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }
        if radius_meters == 0 {
            return Err(ChatError::InvalidRadius);
        }
        Ok(radius_meters.min(self.config.max_radius_m))
    }

    /// Answer one request, failing with the first component error.
    pub async fn handle(
        &self,
        conversation: &[ConversationTurn],
        location: &UserLocation,
        radius_meters: u32,
    ) -> Result<GuideAnswer, RequestError> {
        match self.resolve(conversation, location, radius_meters).await {
            Resolution::Answered(answer) => Ok(answer),
            Resolution::Failed(err) => Err(err),
        }
    }

    /// Run one request to its terminal state. Never retries.
    pub async fn resolve(
        &self,
        conversation: &[ConversationTurn],
        location: &UserLocation,
        radius_meters: u32,
    ) -> Resolution {
        let request_id = Uuid::new_v4();
        let span = info_span!("guide_request", %request_id);
        self.run(conversation, location, radius_meters)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        conversation: &[ConversationTurn],
        location: &UserLocation,
        radius_meters: u32,
    ) -> Resolution {
        info!(
            turns = conversation.len(),
            lat = location.latitude,
            lon = location.longitude,
            radius = radius_meters,
            "Guide request received"
        );

        let mut run = GuideRun::new();
        let outcome = match self.validate(conversation, location, radius_meters) {
            Ok(radius) => self.drive(&mut run, conversation, location, radius).await,
            Err(e) => Err(RequestError::Invalid(e)),
        };

        match outcome {
            Ok(answer) => {
                info!(poi = answer.poi.len(), "Guide request answered");
                Resolution::Answered(answer)
            }
            Err(err) => {
                let from = run.current();
                run.fail();
                error!(error = %err, code = err.code(), state = %from, "Guide request failed");
                Resolution::Failed(err)
            }
        }
    }

    async fn drive(
        &self,
        run: &mut GuideRun,
        conversation: &[ConversationTurn],
        location: &UserLocation,
        radius_meters: u32,
    ) -> Result<GuideAnswer, RequestError> {
        let outcome = self
            .router
            .route(conversation, location, radius_meters)
            .await
            .map_err(RequestError::Routing)?;

        let query = match outcome {
            RouteOutcome::DirectAnswer(text) | RouteOutcome::ClarificationNeeded(text) => {
                run.transition(GuideState::Answered)
                    .map_err(RequestError::Routing)?;
                return Ok(GuideAnswer::text(text));
            }
            RouteOutcome::ToolInvocation(query) => query,
        };

        run.transition(GuideState::Fetching)
            .map_err(RequestError::Routing)?;
        let fetched = self
            .poi_source
            .fetch_nearby(
                query.latitude,
                query.longitude,
                query.radius_meters,
                query.category.as_str(),
            )
            .await
            .map_err(RequestError::Fetching)?;

        let fetched_count = fetched.len();
        let mut records = normalize_for_display(fetched);
        records.truncate(self.config.max_poi_in_prompt);
        info!(
            category = %query.category,
            fetched = fetched_count,
            kept = records.len(),
            "POIs fetched"
        );

        run.transition(GuideState::Composing)
            .map_err(RequestError::Composing)?;
        let text = self
            .composer
            .compose(
                query.category,
                query.keyword.as_deref(),
                &records,
                location,
            )
            .await
            .map_err(RequestError::Composing)?;

        run.transition(GuideState::Answered)
            .map_err(RequestError::Composing)?;
        Ok(GuideAnswer::with_poi(text, records))
    }
}
