//! Answer composition: the second completion call, turning fetched POIs into
//! a short spoken-style answer.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use wayfind_core::geo::{format_distance, haversine_meters};
use wayfind_core::{ConversationTurn, PoiCategory, PoiRecord, Role, UserLocation};

use crate::error::ChatError;
use crate::llm::{CompletionProvider, CompletionRequest};

/// One POI as the model sees it. Coordinates are deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiContextEntry {
    pub name: String,
    pub category: String,
    pub distance_meters: u64,
    pub distance: String,
}

/// Annotate named records with their distance from the caller.
pub fn build_context(records: &[PoiRecord], location: &UserLocation) -> Vec<PoiContextEntry> {
    records
        .iter()
        .filter_map(|r| {
            let name = r.display_name()?;
            let meters = haversine_meters(
                location.latitude,
                location.longitude,
                r.latitude,
                r.longitude,
            );
            Some(PoiContextEntry {
                name: name.to_string(),
                category: r.category.clone(),
                distance_meters: meters.round() as u64,
                distance: format_distance(meters),
            })
        })
        .collect()
}

pub struct AnswerComposer {
    provider: Arc<dyn CompletionProvider>,
    assistant_name: String,
}

impl AnswerComposer {
    pub fn new(provider: Arc<dyn CompletionProvider>, assistant_name: impl Into<String>) -> Self {
        Self {
            provider,
            assistant_name: assistant_name.into(),
        }
    }

    pub fn system_prompt(
        &self,
        category: PoiCategory,
        keyword: Option<&str>,
        count: usize,
    ) -> String {
        let subject = match keyword {
            Some(k) => format!("{} places matching \"{}\"", category.spoken(), k),
            None => format!("{} places", category.spoken()),
        };

        let mut prompt = format!(
            "You are {name}, a friendly voice travel guide recommending nearby {subject}.\n\
             You will be given a JSON list of {count} {subject} near the user.\n\
             \n\
             Rules:\n\
             1. Start by saying how many places were found.\n\
             2. For each place give only its name and how far away it is, using the provided distance (meters or kilometers).\n\
             3. Never mention latitude, longitude, coordinates, ids or any other raw data.\n\
             4. Do not give addresses, opening hours or directions.\n\
             5. Only mention places from the list. Never invent places.\n\
             6. The answer is read aloud: use plain sentences in a simple list, no markdown, no asterisks, no headings.",
            name = self.assistant_name,
        );

        if count == 0 {
            prompt.push_str(&format!(
                "\n\nThe list is empty: no matches were found. Say politely that there are no {} nearby, \
                 then suggest searching for something else, such as {}.",
                category.spoken(),
                PoiCategory::example_list()
            ));
        }
        prompt
    }

    /// The composition call. Prior conversation turns are not included.
    pub fn build_request(
        &self,
        category: PoiCategory,
        keyword: Option<&str>,
        records: &[PoiRecord],
        location: &UserLocation,
    ) -> CompletionRequest {
        let context = build_context(records, location);
        let payload = serde_json::to_string_pretty(&context).unwrap_or_else(|_| "[]".to_string());

        CompletionRequest::new(vec![
            ConversationTurn::new(
                Role::System,
                self.system_prompt(category, keyword, context.len()),
            ),
            ConversationTurn::user(format!(
                "Here are the {} {} places found:\n{}",
                context.len(),
                category.spoken(),
                payload
            )),
        ])
    }

    pub async fn compose(
        &self,
        category: PoiCategory,
        keyword: Option<&str>,
        records: &[PoiRecord],
        location: &UserLocation,
    ) -> Result<String, ChatError> {
        let request = self.build_request(category, keyword, records, location);
        let completion = self.provider.complete(request).await?;

        match completion.trimmed_content() {
            Some(text) => {
                info!(%category, places = records.len(), "Composed answer");
                Ok(text.to_string())
            }
            None => {
                warn!(%category, "Composer returned empty completion");
                Err(ChatError::MalformedResponse(
                    "composer returned no content".to_string(),
                ))
            }
        }
    }
}
