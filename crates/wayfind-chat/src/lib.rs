//! Conversational core for Wayfind.
//!
//! Two-phase tool-calling flow: the [`IntentRouter`] asks the language model
//! whether the turn needs a POI lookup, the POI source is queried when it
//! does, and the [`AnswerComposer`] turns the results into a spoken-style
//! answer. The [`GuideOrchestrator`] sequences the phases.

pub mod composer;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod parser;
pub mod router;
pub mod state;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use composer::AnswerComposer;
pub use error::{ChatError, RequestError};
pub use llm::{Completion, CompletionProvider, CompletionRequest, OpenAiCompatibleClient, ToolCall};
pub use orchestrator::{GuideOrchestrator, Resolution};
pub use wayfind_core::APOLOGY;
pub use parser::{parse_tool_arguments, InvalidReason, ToolArguments};
pub use router::{IntentRouter, RouteOutcome};
pub use state::{GuideRun, GuideState};
