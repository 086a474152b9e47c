//! Speech capture state machine.
//!
//! Valid transitions:
//! - Idle -> Listening (toggle on)
//! - Listening -> Debouncing (recognition result)
//! - Debouncing -> Debouncing (another result, deadline re-armed)
//! - Debouncing -> Dispatching (debounce deadline elapsed)
//! - Dispatching -> Idle (request finished)
//! - Listening -> Idle, Debouncing -> Idle (toggle off, recognition aborted)
//!
//! The machine owns a single debounce deadline. It never talks to a
//! recognizer itself; it returns [`CaptureAction`]s for the shell to perform.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use wayfind_core::config::VoiceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// Microphone off.
    Idle,
    /// Recognizer running, nothing heard yet.
    Listening,
    /// Speech heard; waiting for the silence window to elapse.
    Debouncing,
    /// Utterance handed off to the chat request.
    Dispatching,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Listening => write!(f, "Listening"),
            CaptureState::Debouncing => write!(f, "Debouncing"),
            CaptureState::Dispatching => write!(f, "Dispatching"),
        }
    }
}

impl CaptureState {
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Listening)
                | (CaptureState::Listening, CaptureState::Debouncing)
                | (CaptureState::Debouncing, CaptureState::Debouncing)
                | (CaptureState::Debouncing, CaptureState::Dispatching)
                | (CaptureState::Dispatching, CaptureState::Idle)
                // Toggle off
                | (CaptureState::Listening, CaptureState::Idle)
                | (CaptureState::Debouncing, CaptureState::Idle)
        )
    }
}

/// Input from the user or the platform recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// Microphone button pressed.
    Toggle,
    /// Recognizer produced a transcript for the current utterance.
    Result(String),
    /// Recognizer stopped on its own (silence, platform timeout).
    RecognitionEnded,
    /// The debounce deadline passed.
    DeadlineElapsed,
    /// The chat request for the dispatched utterance finished.
    DispatchComplete,
}

/// Side effects for the shell to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureAction {
    /// Silence any answer currently being spoken.
    CancelSpeech,
    StartRecognition,
    /// Stop and discard the in-progress recognition.
    AbortRecognition,
    /// Stop recognition, keeping what was heard.
    StopRecognition,
    /// Send the finalized utterance as a user turn.
    Dispatch(String),
}

#[derive(Debug, Clone)]
pub struct SpeechCapture {
    state: CaptureState,
    debounce: Duration,
    transcript: String,
    deadline: Option<Instant>,
}

impl SpeechCapture {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: CaptureState::Idle,
            debounce,
            transcript: String::new(),
            deadline: None,
        }
    }

    pub fn from_config(config: &VoiceConfig) -> Self {
        Self::new(config.debounce())
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Pending dispatch deadline, set only while debouncing.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Latest recognized text for the current utterance.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Apply one event at time `now`. Events that do not apply to the
    /// current state are ignored.
    pub fn handle(&mut self, event: CaptureEvent, now: Instant) -> Vec<CaptureAction> {
        match (self.state, event) {
            (CaptureState::Idle, CaptureEvent::Toggle) => {
                self.transcript.clear();
                self.set_state(CaptureState::Listening);
                vec![CaptureAction::CancelSpeech, CaptureAction::StartRecognition]
            }
            (CaptureState::Listening | CaptureState::Debouncing, CaptureEvent::Toggle) => {
                self.deadline = None;
                self.transcript.clear();
                self.set_state(CaptureState::Idle);
                vec![CaptureAction::AbortRecognition]
            }
            (CaptureState::Listening | CaptureState::Debouncing, CaptureEvent::Result(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Vec::new();
                }
                self.transcript = text.to_string();
                self.deadline = Some(now + self.debounce);
                self.set_state(CaptureState::Debouncing);
                Vec::new()
            }
            (CaptureState::Listening | CaptureState::Debouncing, CaptureEvent::RecognitionEnded) => {
                // Still toggled on: keep the recognizer running.
                vec![CaptureAction::StartRecognition]
            }
            (CaptureState::Debouncing, CaptureEvent::DeadlineElapsed) => {
                match self.deadline {
                    Some(deadline) if now >= deadline => {}
                    _ => return Vec::new(),
                }
                self.deadline = None;
                let utterance = std::mem::take(&mut self.transcript);
                self.set_state(CaptureState::Dispatching);
                info!(chars = utterance.len(), "Dispatching utterance");
                vec![
                    CaptureAction::StopRecognition,
                    CaptureAction::Dispatch(utterance),
                ]
            }
            (CaptureState::Dispatching, CaptureEvent::DispatchComplete) => {
                self.set_state(CaptureState::Idle);
                Vec::new()
            }
            (state, event) => {
                debug!(%state, ?event, "Capture event ignored");
                Vec::new()
            }
        }
    }

    fn set_state(&mut self, target: CaptureState) {
        if self.state.can_transition_to(&target) {
            if self.state != target {
                debug!("Capture state: {} -> {}", self.state, target);
            }
            self.state = target;
        } else {
            tracing::warn!("Invalid capture transition: {} -> {}", self.state, target);
        }
    }
}

/// Drive a [`SpeechCapture`] from an event channel, firing
/// [`CaptureEvent::DeadlineElapsed`] when the debounce window closes.
///
/// Returns when the event channel closes or the action receiver is dropped.
pub async fn run_capture(
    mut capture: SpeechCapture,
    mut events: mpsc::Receiver<CaptureEvent>,
    actions: mpsc::Sender<CaptureAction>,
) -> SpeechCapture {
    loop {
        let deadline = capture.deadline();
        let event = tokio::select! {
            received = events.recv() => match received {
                Some(event) => event,
                None => return capture,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                CaptureEvent::DeadlineElapsed
            }
        };

        for action in capture.handle(event, Instant::now()) {
            if actions.send(action).await.is_err() {
                return capture;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
