//! The conversation as shown to the user.
//!
//! Turns are append-only. While a request is in flight the transcript is
//! loading; each request ends with exactly one assistant turn, the answer
//! or the apology.

use wayfind_core::{ConversationTurn, GuideAnswer, Role, APOLOGY};

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
    loading: bool,
}

impl Transcript {
    /// A transcript opening with the guide's greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![ConversationTurn::assistant(greeting)],
            loading: false,
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Append the user's turn and mark a request in flight.
    ///
    /// Returns the conversation to send, or `None` when the text is blank
    /// or a request is already pending.
    pub fn begin_request(&mut self, text: &str) -> Option<Vec<ConversationTurn>> {
        let text = text.trim();
        if text.is_empty() || self.loading {
            return None;
        }
        self.turns.push(ConversationTurn::user(text));
        self.loading = true;
        Some(self.turns.clone())
    }

    /// Record the answer for the pending request.
    pub fn complete(&mut self, answer: &GuideAnswer) {
        self.finish(answer.content.clone());
    }

    /// Record a failed request as the apology turn.
    pub fn fail(&mut self) {
        self.finish(APOLOGY.to_string());
    }

    fn finish(&mut self, content: String) {
        if !self.loading {
            tracing::warn!("Transcript finish without a pending request");
            return;
        }
        self.turns.push(ConversationTurn::new(Role::Assistant, content));
        self.loading = false;
    }
}
