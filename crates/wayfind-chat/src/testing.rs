//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use wayfind_core::PoiRecord;
use wayfind_poi::{PoiError, PoiSource};

use crate::error::ChatError;
use crate::llm::{Completion, CompletionProvider, CompletionRequest};

/// Replies with queued completions in order and records every request.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Completion, ChatError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<Completion, ChatError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
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
            .unwrap_or_else(|| Err(ChatError::UpstreamUnavailable("script exhausted".to_string())))
    }
}

/// Returns fixed records, or an upstream failure when `fail` is set.
#[derive(Default)]
pub struct StubPoiSource {
    pub records: Vec<PoiRecord>,
    pub fail: bool,
    calls: Mutex<Vec<(f64, f64, u32, String)>>,
}

impl StubPoiSource {
    pub fn with_records(records: Vec<PoiRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(f64, f64, u32, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PoiSource for StubPoiSource {
    async fn fetch_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<PoiRecord>, PoiError> {
        self.calls
            .lock()
            .unwrap()
            .push((latitude, longitude, radius_meters, category.to_string()));
        if self.fail {
            return Err(PoiError::UpstreamUnavailable("Overpass status 504".to_string()));
        }
        Ok(self.records.clone())
    }
}

pub fn poi(id: &str, name: Option<&str>, lat: f64, lon: f64) -> PoiRecord {
    PoiRecord {
        id: id.to_string(),
        latitude: lat,
        longitude: lon,
        name: name.map(str::to_string),
        category: "cafe".to_string(),
    }
}
