//! Request bodies sent to the agent service.

use serde::{Deserialize, Serialize};

/// Body of the `POST /run` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: NewMessage,
}

/// The user turn carried by a [`RunRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: String,
    pub parts: Vec<TextPart>,
}

/// A plain text part of an outgoing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

impl RunRequest {
    /// Build a run request carrying a single user text part.
    pub fn user_text(app_name: &str, user_id: &str, session_id: &str, text: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            new_message: NewMessage {
                role: "user".to_string(),
                parts: vec![TextPart {
                    text: text.to_string(),
                }],
            },
        }
    }
}
