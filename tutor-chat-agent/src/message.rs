//! Assistant message assembly from `/run` responses.

use serde_json::Value;

use crate::extract::extract;
use crate::materialize::materialize;
use crate::protocol::RawResponse;
use crate::sanitize::sanitize;
use crate::visualization::{CircuitRecord, PlotRecord};

/// Text shown for a displayable response that carries no prose.
pub const PROCESSING_TEXT: &str = "I'm processing your request...";

/// Text shown when a `/run` call returned nothing displayable.
pub const FALLBACK_WORKING_TEXT: &str =
    "I'm working on your request. The response may include function calls or other processing.";

/// One assistant message built from a single agent response.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantMessage {
    /// The response's `id`.
    pub id: String,
    /// Text parts joined by a single space.
    pub text: String,
    /// Response timestamp in milliseconds.
    pub timestamp_ms: i64,
    pub raw: RawResponse,
}

/// Display-ready content of a message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreparedContent {
    /// Sanitized text.
    pub text: String,
    /// Plot records with their specs materialized.
    pub plots: Vec<PlotRecord>,
    pub circuits: Vec<CircuitRecord>,
}

impl PreparedContent {
    pub fn has_visualization(&self) -> bool {
        !self.plots.is_empty() || !self.circuits.is_empty()
    }
}

impl AssistantMessage {
    /// Build a message from a parsed response, or `None` when no part is
    /// displayable.
    pub fn from_raw(raw: RawResponse) -> Option<Self> {
        if !raw.parts().iter().any(|p| p.is_displayable()) {
            return None;
        }
        let joined = raw.texts().collect::<Vec<_>>().join(" ");
        let text = if joined.is_empty() {
            PROCESSING_TEXT.to_string()
        } else {
            joined
        };
        Some(Self {
            id: raw.id.clone(),
            text,
            timestamp_ms: (raw.timestamp * 1000.0) as i64,
            raw,
        })
    }

    /// Sanitize the text, extract visualizations and materialize plot specs.
    pub fn prepare(&self) -> PreparedContent {
        prepare_content(&self.text, Some(&self.raw))
    }
}

/// Prepare arbitrary message text for display against an optional response.
pub fn prepare_content(text: &str, raw: Option<&RawResponse>) -> PreparedContent {
    let visualizations = extract(raw);
    let plots = visualizations
        .plots
        .into_iter()
        .map(|mut plot| {
            plot.plot_spec = plot.plot_spec.as_ref().map(materialize);
            plot
        })
        .collect();
    PreparedContent {
        text: sanitize(text, raw),
        plots,
        circuits: visualizations.circuits,
    }
}

/// Turn the JSON array returned by `/run` into assistant messages.
///
/// Entries that are not objects or carry nothing displayable are dropped.
/// An empty result means the caller should show [`FALLBACK_WORKING_TEXT`].
pub fn assistant_messages(responses: &[Value]) -> Vec<AssistantMessage> {
    responses
        .iter()
        .filter_map(|value| {
            let raw = RawResponse::from_value(value);
            if raw.is_none() {
                log::debug!("Skipping non-object run response entry");
            }
            raw
        })
        .filter_map(AssistantMessage::from_raw)
        .collect()
}
