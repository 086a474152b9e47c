//! Front-end state models for the Wayfind voice guide.
//!
//! These types hold the client-side behaviour that sits around the chat API:
//! speech capture with a debounce window, sentence chunking for speech
//! output, the visible transcript and the map widget's state. They are
//! platform-agnostic; a browser or native shell drives them with events.
//!
//! # Modules
//!
//! - [`capture`]: speech capture state machine and its async driver
//! - [`speech`]: answer text split into spoken utterances, and playback state
//! - [`transcript`]: conversation shown to the user plus the loading flag
//! - [`map_session`]: markers, radius circle and route for the map widget

pub mod capture;
pub mod map_session;
pub mod speech;
pub mod transcript;

pub use capture::{CaptureAction, CaptureEvent, CaptureState, SpeechCapture};
pub use map_session::{MapMarker, MapSession, RadiusCircle, Route};
pub use speech::{split_sentences, PlaybackAction, SpeechPlan, SpeechPlayback, Utterance};
pub use transcript::Transcript;
