// Library exports for testing and potential library use

/// Application version (root crate version).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod cli;
pub mod client;
pub mod conversation;
pub mod debug;
pub mod http;
pub mod render;

/// Configuration re-exports from the `tutor-chat-config` sub-crate.
pub mod config {
    pub use tutor_chat_config::*;
}
