//! Agent wire model.
//!
//! These types mirror the JSON objects returned by the tutoring agent's
//! `/run` endpoint:
//!
//! ```text
//! { "content": { "parts": [Part, ...] }, "author": "...", "timestamp": 1.7e9, "id": "..." }
//! ```
//!
//! The module is organized by domain:
//! - [`part`]: the per-part sum type (`text` / `functionCall` / `functionResponse`)
//! - [`run`]: request bodies the client sends (`/run`, session creation)
//!
//! Parsing is by shape-probing over a [`serde_json::Value`] rather than serde
//! derives, because a part is discriminated by which optional field is
//! populated rather than by a tag field.

pub mod part;
pub mod run;

pub use part::{FunctionCall, FunctionResponse, Part};
pub use run::{NewMessage, RunRequest, TextPart};

use serde_json::Value;

/// The `content` object of an agent response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// One agent response as returned by the `/run` endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawResponse {
    pub content: Option<Content>,
    pub author: String,
    /// Seconds since the Unix epoch (fractional).
    pub timestamp: f64,
    pub id: String,
}

impl RawResponse {
    /// Parse a response from its raw JSON [`Value`].
    ///
    /// Returns `None` when the top-level value is not an object. Missing or
    /// mistyped fields fall back to empty defaults instead of failing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let content = obj.get("content").and_then(|c| c.as_object()).map(|c| {
            let parts = c
                .get("parts")
                .and_then(|p| p.as_array())
                .map(|arr| arr.iter().map(Part::from_value).collect())
                .unwrap_or_default();
            Content { parts }
        });

        let author = obj
            .get("author")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let timestamp = obj.get("timestamp").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let id = obj
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Some(Self {
            content,
            author,
            timestamp,
            id,
        })
    }

    /// The response's parts, or an empty slice when there is no content.
    pub fn parts(&self) -> &[Part] {
        self.content
            .as_ref()
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over the text of every `text` part, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts().iter().filter_map(|part| match part {
            Part::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Iterate over every function response, in order.
    pub fn function_responses(&self) -> impl Iterator<Item = &FunctionResponse> {
        self.parts().iter().filter_map(|part| match part {
            Part::FunctionResponse(resp) => Some(resp),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
