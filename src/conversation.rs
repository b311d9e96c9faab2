//! Conversation state: the ordered message list and its error wording.

use std::ops::Range;

use serde_json::Value;
use tutor_chat_agent::{
    FALLBACK_WORKING_TEXT, NotificationLatch, PreparedContent, RawResponse, assistant_messages,
    prepare_content,
};

use crate::client::ClientError;

pub const AUTH_FAILED_TEXT: &str =
    "Authentication failed. Please check your auth token configuration.";
pub const SESSION_AUTH_FAILED_TEXT: &str =
    "Authentication failed. Please check your configuration and try again.";
pub const CONNECTION_FAILED_TEXT: &str = "Sorry, I couldn't connect to the server. Please check if the API server is running and CORS is configured.";
pub const GENERIC_FAILURE_TEXT: &str = "Sorry, I couldn't connect to the server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp_ms: i64,
    /// The agent response this message came from; `None` for user input and
    /// locally generated messages.
    pub raw: Option<RawResponse>,
    /// Set once the message has been prepared and found to carry a plot or
    /// circuit.
    pub has_visualization: bool,
    latch: NotificationLatch,
}

impl ChatMessage {
    fn local(id: String, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            raw: None,
            has_visualization: false,
            latch: NotificationLatch::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_local_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Record user input. Returns the trimmed text to send, or `None` when
    /// the input is blank (nothing is recorded).
    pub fn submit(&mut self, input: &str) -> Option<String> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.local_id();
        self.messages.push(ChatMessage::local(id, Role::User, text));
        Some(text.to_string())
    }

    /// Append the outcome of a `/run` call and return the indices of the
    /// appended messages.
    pub fn apply_run_result(&mut self, result: Result<Vec<Value>, ClientError>) -> Range<usize> {
        let start = self.messages.len();
        match result {
            Ok(responses) => self.push_responses(&responses),
            Err(e) => {
                log::warn!("Run failed: {e}");
                let id = self.local_id();
                self.messages
                    .push(ChatMessage::local(id, Role::Assistant, error_text(&e)));
            }
        }
        start..self.messages.len()
    }

    /// Record that the server rejected session creation with a 401.
    pub fn session_rejected(&mut self) -> Range<usize> {
        let start = self.messages.len();
        let id = self.local_id();
        self.messages.push(ChatMessage::local(
            id,
            Role::Assistant,
            SESSION_AUTH_FAILED_TEXT,
        ));
        start..self.messages.len()
    }

    /// Append assistant messages for raw `/run` responses, or the fallback
    /// text when none are displayable.
    pub fn push_responses(&mut self, responses: &[Value]) {
        let assistant = assistant_messages(responses);
        if assistant.is_empty() {
            let id = self.local_id();
            self.messages
                .push(ChatMessage::local(id, Role::Assistant, FALLBACK_WORKING_TEXT));
            return;
        }
        for message in assistant {
            self.messages.push(ChatMessage {
                id: message.id,
                role: Role::Assistant,
                content: message.text,
                timestamp_ms: message.timestamp_ms,
                raw: Some(message.raw),
                has_visualization: false,
                latch: NotificationLatch::default(),
            });
        }
    }

    /// Prepare message `index` for display.
    ///
    /// The first time a message turns out to carry a visualization its
    /// `has_visualization` flag is set and `on_visualization` is called with
    /// the message id. Preparing it again never calls it a second time.
    pub fn prepare(
        &mut self,
        index: usize,
        on_visualization: impl FnOnce(&str),
    ) -> Option<PreparedContent> {
        let message = self.messages.get_mut(index)?;
        let prepared = prepare_content(&message.content, message.raw.as_ref());

        let id = &message.id;
        let has_visualization = prepared.has_visualization();
        if message
            .latch
            .notify_once(has_visualization, || on_visualization(id))
        {
            message.has_visualization = true;
        }
        Some(prepared)
    }

    fn local_id(&mut self) -> String {
        self.next_local_id += 1;
        format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            self.next_local_id
        )
    }
}

/// User-facing text for a failed `/run` call.
pub fn error_text(error: &ClientError) -> String {
    match error {
        ClientError::Unauthorized => AUTH_FAILED_TEXT.to_string(),
        ClientError::Status { code, reason, .. } => format!(
            "Sorry, I encountered an error processing your message. ({code}: {reason})"
        ),
        ClientError::Connection(_) => CONNECTION_FAILED_TEXT.to_string(),
        ClientError::InvalidBody(_) => GENERIC_FAILURE_TEXT.to_string(),
    }
}
