//! Shared domain types for the Wayfind system.
//!
//! Everything here is request-scoped: the caller supplies the conversation
//! and location on every call and nothing is persisted between requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::PoiCategory;

// =============================================================================
// Conversation
// =============================================================================

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// One message in the caller-supplied conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// =============================================================================
// Location
// =============================================================================

/// The caller's position. Supplied per request, never inferred server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable place name, e.g. a city.
    pub label: Option<String>,
}

impl UserLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label used in prompts: the caller's label when present, otherwise the
    /// coordinates at four decimal places.
    pub fn prompt_label(&self) -> String {
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("{:.4},{:.4}", self.latitude, self.longitude),
        }
    }

    /// Whether both coordinates are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

// =============================================================================
// POI
// =============================================================================

/// A validated request for nearby points of interest.
///
/// Only constructed from a tool invocation that carried a recognized
/// category.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub category: PoiCategory,
    pub keyword: Option<String>,
}

/// One matched geographic entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    /// Opaque identifier, e.g. `node/123456`.
    pub id: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub category: String,
}

impl PoiRecord {
    /// Trimmed name, or `None` for missing and blank names.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

// =============================================================================
// Answer
// =============================================================================

/// Fixed answer for any failed request. Upstream error text is never shown.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Terminal artifact returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideAnswer {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub poi: Vec<PoiRecord>,
}

impl GuideAnswer {
    /// An answer without POI results.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            poi: Vec::new(),
        }
    }

    pub fn with_poi(content: impl Into<String>, poi: Vec<PoiRecord>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            poi,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
