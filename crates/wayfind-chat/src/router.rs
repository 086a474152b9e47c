//! Intent routing: the first completion call of every request.
//!
//! The model sees the full conversation plus the `getNearbyPOIs` tool and
//! decides whether to answer directly or search. Its decision is mapped to a
//! [`RouteOutcome`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use wayfind_core::{ConversationTurn, PoiCategory, PoiQuery, UserLocation};

use crate::error::ChatError;
use crate::llm::{Completion, CompletionProvider, CompletionRequest};
use crate::parser::{parse_tool_arguments, ToolArguments};
use crate::tools::{poi_tool_definition, POI_TOOL_NAME};

/// What the router decided for a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The model answered without a tool. Text is returned unchanged.
    DirectAnswer(String),
    /// The model tried a lookup without a usable category.
    ClarificationNeeded(String),
    ToolInvocation(PoiQuery),
}

/// Question asked when the model wanted a lookup but gave neither a usable
/// category nor any text of its own.
pub fn default_clarification() -> String {
    format!(
        "Sure! Which type of place are you interested in? For example: {}.",
        PoiCategory::example_list()
    )
}

pub struct IntentRouter {
    provider: Arc<dyn CompletionProvider>,
    assistant_name: String,
    max_radius_m: u32,
}

impl IntentRouter {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        assistant_name: impl Into<String>,
        max_radius_m: u32,
    ) -> Self {
        Self {
            provider,
            assistant_name: assistant_name.into(),
            max_radius_m,
        }
    }

    /// System instruction for the routing call.
    pub fn system_prompt(&self, location: &UserLocation) -> String {
        let vocabulary: Vec<String> = PoiCategory::ALL
            .iter()
            .map(|c| format!("{} ({})", c.as_str(), c.tag_key().as_str()))
            .collect();

        format!(
            "You are {name}, a friendly voice travel guide for {place}.\n\
             Your job is to help the user discover real points of interest near their current location.\n\
             \n\
             Rules:\n\
             1. When the user asks for a type of place, call the {tool} tool with the matching category.\n\
             2. The category MUST be one of these OpenStreetMap tag values: {vocabulary}.\n\
             3. When the user is vague (\"interesting places\", \"things to do\", \"sights\", \"places to visit\", \"any good spots\"), call the tool with category \"attraction\".\n\
             4. For greetings or questions about what you can do, reply briefly and offer to find restaurants, cafes, museums and more. Do not call the tool.\n\
             5. NEVER make up place names or details. Only mention places returned by the tool.\n\
             6. Politely decline requests outside travel guidance, such as booking or buying things, acting in the physical world or sharing private information.\n\
             7. Keep answers short and friendly. They are read aloud, so do not use markdown.",
            name = self.assistant_name,
            place = location.prompt_label(),
            tool = POI_TOOL_NAME,
            vocabulary = vocabulary.join(", "),
        )
    }

    /// The routing call: system instruction, the conversation, one tool.
    pub fn build_request(
        &self,
        conversation: &[ConversationTurn],
        location: &UserLocation,
        radius_meters: u32,
    ) -> CompletionRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ConversationTurn::new(
            wayfind_core::Role::System,
            self.system_prompt(location),
        ));
        messages.extend_from_slice(conversation);

        CompletionRequest::new(messages).with_tools(vec![poi_tool_definition(radius_meters)])
    }

    pub async fn route(
        &self,
        conversation: &[ConversationTurn],
        location: &UserLocation,
        radius_meters: u32,
    ) -> Result<RouteOutcome, ChatError> {
        let request = self.build_request(conversation, location, radius_meters);
        let completion = self.provider.complete(request).await?;
        let outcome = interpret(completion, location, radius_meters, self.max_radius_m)?;

        match &outcome {
            RouteOutcome::DirectAnswer(_) => info!("Routed to direct answer"),
            RouteOutcome::ClarificationNeeded(_) => info!("Routed to clarification"),
            RouteOutcome::ToolInvocation(q) => info!(
                category = %q.category,
                radius = q.radius_meters,
                keyword = q.keyword.as_deref().unwrap_or(""),
                "Routed to POI search"
            ),
        }
        Ok(outcome)
    }
}

/// Map a routing completion to an outcome.
///
/// Only the first tool call is considered. Without a tool call the reply
/// text is passed through as is, even when empty.
pub fn interpret(
    completion: Completion,
    location: &UserLocation,
    default_radius: u32,
    max_radius: u32,
) -> Result<RouteOutcome, ChatError> {
    let clarification = |completion: &Completion| {
        completion
            .trimmed_content()
            .map(str::to_string)
            .unwrap_or_else(default_clarification)
    };

    let Some(call) = completion.tool_calls.first() else {
        return Ok(RouteOutcome::DirectAnswer(
            completion.content.unwrap_or_default(),
        ));
    };

    if call.name != POI_TOOL_NAME {
        warn!(tool = %call.name, "Model called an unknown tool");
        return Ok(RouteOutcome::ClarificationNeeded(clarification(&completion)));
    }

    match parse_tool_arguments(&call.arguments, location, default_radius, max_radius)? {
        ToolArguments::Valid(query) => Ok(RouteOutcome::ToolInvocation(query)),
        ToolArguments::Invalid(reason) => {
            debug!(%reason, "Tool call without usable category");
            Ok(RouteOutcome::ClarificationNeeded(clarification(&completion)))
        }
    }
}
