//! Per-request guide state machine.
//!
//! Valid transitions:
//! - Routing -> Answered (direct answer or clarification)
//! - Routing -> Fetching (tool invocation)
//! - Fetching -> Composing (POIs fetched and normalized)
//! - Composing -> Answered
//! - Routing | Fetching | Composing -> Failed

use std::fmt;

use crate::error::ChatError;

/// Phase of one orchestrated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideState {
    /// Waiting on the routing completion.
    Routing,
    /// Waiting on the POI source.
    Fetching,
    /// Waiting on the composing completion.
    Composing,
    Answered,
    Failed,
}

impl fmt::Display for GuideState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuideState::Routing => write!(f, "Routing"),
            GuideState::Fetching => write!(f, "Fetching"),
            GuideState::Composing => write!(f, "Composing"),
            GuideState::Answered => write!(f, "Answered"),
            GuideState::Failed => write!(f, "Failed"),
        }
    }
}

impl GuideState {
    pub fn can_transition_to(&self, target: &GuideState) -> bool {
        matches!(
            (self, target),
            (GuideState::Routing, GuideState::Answered)
                | (GuideState::Routing, GuideState::Fetching)
                | (GuideState::Fetching, GuideState::Composing)
                | (GuideState::Composing, GuideState::Answered)
                // Failure from any in-flight phase
                | (GuideState::Routing, GuideState::Failed)
                | (GuideState::Fetching, GuideState::Failed)
                | (GuideState::Composing, GuideState::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GuideState::Answered | GuideState::Failed)
    }
}

/// State of a single request. Owned by the request's task, so no locking.
#[derive(Debug, Clone)]
pub struct GuideRun {
    state: GuideState,
    history: Vec<GuideState>,
}

impl Default for GuideRun {
    fn default() -> Self {
        Self::new()
    }
}

impl GuideRun {
    /// A run starts in `Routing`.
    pub fn new() -> Self {
        Self {
            state: GuideState::Routing,
            history: vec![GuideState::Routing],
        }
    }

    pub fn current(&self) -> GuideState {
        self.state
    }

    /// Every state visited, in order.
    pub fn history(&self) -> &[GuideState] {
        &self.history
    }

    pub fn transition(&mut self, target: GuideState) -> Result<(), ChatError> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Guide state: {} -> {}", self.state, target);
            self.state = target;
            self.history.push(target);
            Ok(())
        } else {
            Err(ChatError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Move to `Failed`. No-op once terminal.
    pub fn fail(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        tracing::debug!("Guide state: {} -> Failed", self.state);
        self.state = GuideState::Failed;
        self.history.push(GuideState::Failed);
    }
}

// =============================================================================
// Tests
// =============================================================================
