//! Speech output planning: answer text split into utterances.
//!
//! Each sentence is spoken as its own utterance so playback can pause
//! between sentences and be cancelled mid-answer.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use tracing::debug;

use wayfind_core::config::VoiceConfig;

/// Sentence-ending punctuation followed by whitespace.
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+").expect("Invalid sentence regex"));

/// Markdown emphasis and heading markers, which synthesizers read aloud.
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*#`]+").expect("Invalid markup regex"));

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
///
/// Punctuation stays with its sentence; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        push_trimmed(&mut sentences, &text[start..m.end()]);
        start = m.end();
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

/// One chunk handed to the speech synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub text: String,
    /// Preferred voice language, e.g. `en-GB`.
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Ordered utterances for one answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeechPlan {
    pub utterances: Vec<Utterance>,
}

impl SpeechPlan {
    pub fn from_answer(text: &str, voice: &VoiceConfig) -> Self {
        let cleaned = MARKUP.replace_all(text, "");
        let utterances = split_sentences(&cleaned)
            .into_iter()
            .map(|sentence| Utterance {
                text: sentence,
                lang: voice.voice_lang.clone(),
                rate: voice.rate,
                pitch: voice.pitch,
                volume: voice.volume,
            })
            .collect();
        Self { utterances }
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    /// Utterance texts in playback order.
    pub fn texts(&self) -> Vec<&str> {
        self.utterances.iter().map(|u| u.text.as_str()).collect()
    }
}

/// What the synthesizer should do after a playback event.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackAction {
    /// Stop speaking and drop queued utterances.
    Cancel,
    /// Queue these utterances in order.
    Speak(SpeechPlan),
}

/// Playback state for the speaker button.
///
/// Remembers the last answer so an idle toggle replays it. Speaking ends
/// when every queued utterance has finished or playback is cancelled.
#[derive(Debug, Clone, Default)]
pub struct SpeechPlayback {
    last: SpeechPlan,
    remaining: usize,
}

impl SpeechPlayback {
    pub fn is_speaking(&self) -> bool {
        self.remaining > 0
    }

    pub fn last(&self) -> &SpeechPlan {
        &self.last
    }

    /// A new answer arrived: remember it and speak it, replacing anything
    /// still playing.
    pub fn announce(&mut self, plan: SpeechPlan) -> Vec<PlaybackAction> {
        let mut actions = Vec::new();
        if self.is_speaking() {
            actions.push(PlaybackAction::Cancel);
        }
        self.last = plan;
        self.remaining = self.last.len();
        if !self.last.is_empty() {
            actions.push(PlaybackAction::Speak(self.last.clone()));
        }
        actions
    }

    /// The speaker button: cancel while speaking, otherwise replay the
    /// last answer. `None` when idle with nothing to replay.
    pub fn toggle(&mut self) -> Option<PlaybackAction> {
        if self.is_speaking() {
            self.remaining = 0;
            debug!("Speech playback cancelled");
            return Some(PlaybackAction::Cancel);
        }
        if self.last.is_empty() {
            return None;
        }
        self.remaining = self.last.len();
        debug!(utterances = self.remaining, "Replaying last answer");
        Some(PlaybackAction::Speak(self.last.clone()))
    }

    /// Stop playback, e.g. when the microphone opens.
    pub fn cancel(&mut self) -> Option<PlaybackAction> {
        if !self.is_speaking() {
            return None;
        }
        self.remaining = 0;
        Some(PlaybackAction::Cancel)
    }

    /// The synthesizer finished one utterance.
    pub fn utterance_finished(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}
