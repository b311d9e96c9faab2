//! Blocking client for the tutoring agent API.
//!
//! Two endpoints are used:
//! - `POST {api}/apps/{app}/users/{user}/sessions/{session}` creates a session
//! - `POST {api}/run` sends one user message and returns the agent's responses

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;
use thiserror::Error;
use tutor_chat_agent::RunRequest;
use tutor_chat_config::Config;
use ureq::Agent;

/// Errors from talking to the agent API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered 401.
    #[error("authentication failed (401 Unauthorized)")]
    Unauthorized,

    /// Any other non-success status.
    #[error("server returned {code} {reason}")]
    Status {
        code: u16,
        reason: String,
        body: String,
    },

    /// Transport failure: DNS, refused connection, TLS, timeout.
    #[error("could not reach the server: {0}")]
    Connection(String),

    /// The `/run` body was not a JSON array of responses.
    #[error("invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Status, reason phrase and body of a completed request.
struct Reply {
    code: u16,
    reason: String,
    body: String,
}

impl Reply {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    fn into_error(self) -> ClientError {
        if self.code == 401 {
            ClientError::Unauthorized
        } else {
            ClientError::Status {
                code: self.code,
                reason: self.reason,
                body: self.body,
            }
        }
    }
}

/// Client for one API server, app and user.
pub struct AgentClient {
    agent: Agent,
    api_base: String,
    app_name: String,
    user_id: String,
    auth_token: Option<String>,
}

impl AgentClient {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: crate::http::agent(Duration::from_secs(config.request_timeout_secs)),
            api_base: config.api_base().to_string(),
            app_name: config.app_name.clone(),
            user_id: config.user_id.clone(),
            auth_token: config.auth_token.clone().filter(|t| !t.is_empty()),
        }
    }

    /// Mint a session id and register it with the server.
    ///
    /// Only a 401 is fatal. Any other failure is logged and the minted id is
    /// returned anyway, since the server creates sessions lazily on `/run`.
    pub fn create_session(&self) -> Result<String, ClientError> {
        let session_id = mint_session_id();
        let url = self.session_url(&session_id);
        log::info!("Creating session {session_id}");

        match self.post(&url, "{}") {
            Ok(reply) if reply.is_success() => {
                log::debug!("Session {session_id} created");
            }
            Ok(reply) if reply.code == 401 => return Err(ClientError::Unauthorized),
            Ok(reply) => {
                log::warn!(
                    "Session creation returned {} {}; continuing with {session_id}",
                    reply.code,
                    reply.reason
                );
            }
            Err(e) => {
                log::warn!("Session creation failed: {e}; continuing with {session_id}");
            }
        }
        Ok(session_id)
    }

    /// Send `text` as a user message in `session_id` and return the raw
    /// response objects.
    pub fn run(&self, session_id: &str, text: &str) -> Result<Vec<Value>, ClientError> {
        let request = RunRequest::user_text(&self.app_name, &self.user_id, session_id, text);
        let body = serde_json::to_string(&request)?;
        let url = format!("{}/run", self.api_base);

        log::info!("POST {url} ({} bytes)", body.len());
        let reply = self.post(&url, &body)?;
        if !reply.is_success() {
            log::warn!("Run request failed: {} {}", reply.code, reply.reason);
            return Err(reply.into_error());
        }

        let responses: Vec<Value> = serde_json::from_str(&reply.body)?;
        log::debug!("Run returned {} responses", responses.len());
        Ok(responses)
    }

    pub fn session_url(&self, session_id: &str) -> String {
        format!(
            "{}/apps/{}/users/{}/sessions/{}",
            self.api_base, self.app_name, self.user_id, session_id
        )
    }

    fn post(&self, url: &str, body: &str) -> Result<Reply, ClientError> {
        let mut request = self
            .agent
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let mut response = request
            .send(body)
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Reply {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

/// `s_<unix millis>`.
fn mint_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("s_{millis}")
}
