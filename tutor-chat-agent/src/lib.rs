//! tutor-chat-agent: response model and visualization pipeline for the
//! tutoring agent.
//!
//! This crate turns the JSON returned by the agent's `/run` endpoint into
//! display-ready content. It does no I/O; the `tutor-chat` binary owns the
//! transport and the terminal.
//!
//! # Architecture
//!
//! - [`protocol`] - Response and request wire types (`RawResponse`, `Part`, `RunRequest`)
//! - [`decode`] - Base64 typed-array decoding (`bdata` + `dtype`)
//! - [`visualization`] - Plot and circuit record types
//! - [`extract`] - Tool-response walker producing [`Visualizations`]
//! - [`sanitize`] - Multi-pass removal of payload echoes from narration
//! - [`materialize`] - Renderer-ready copies of plot specs with decoded axes
//! - [`latch`] - Fire-once "has visualization" notification
//! - [`message`] - Assistant message assembly and preparation
//!
//! # Example
//!
//! ```ignore
//! use tutor_chat_agent::assistant_messages;
//!
//! let responses: Vec<serde_json::Value> = serde_json::from_str(&body)?;
//! for message in assistant_messages(&responses) {
//!     let prepared = message.prepare();
//!     println!("{}", prepared.text);
//!     for plot in &prepared.plots {
//!         println!("plot: {}", plot.title);
//!     }
//! }
//! ```

pub mod decode;
pub mod extract;
pub mod latch;
pub mod materialize;
pub mod message;
pub mod protocol;
pub mod sanitize;
pub mod visualization;

// Re-export the main public types at the crate root for convenience
pub use decode::{DecodeError, DecodedSeries, ElementType, decode};
pub use extract::extract;
pub use latch::NotificationLatch;
pub use materialize::materialize;
pub use message::{
    AssistantMessage, FALLBACK_WORKING_TEXT, PreparedContent, assistant_messages, prepare_content,
};
pub use protocol::{Part, RawResponse, RunRequest};
pub use sanitize::sanitize;
pub use visualization::{
    AxisData, CircuitRecord, EncodedArray, PlotRecord, PlotSpec, Series, Visualizations,
};
