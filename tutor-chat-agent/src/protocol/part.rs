//! Content part variants.

use serde_json::Value;

/// A tool invocation the agent has issued but not yet answered.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Value,
}

/// The named, structured result of a tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    /// Tool name; empty when the agent omitted it.
    pub name: String,
    /// The tool's result body, usually an object.
    pub response: Value,
}

/// One positional part of an agent response.
///
/// Not serde-derived: the wire format has no discriminator field, the variant
/// is decided by which optional key is populated.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Narrated prose.
    Text(String),
    /// A pending tool call (carries no result payload).
    FunctionCall(FunctionCall),
    /// A completed tool call with its result payload.
    FunctionResponse(FunctionResponse),
    /// Anything else (inline data, future part kinds), preserved as raw JSON.
    Unknown(Value),
}

impl Part {
    /// Parse a part from its raw JSON [`Value`].
    ///
    /// Keys are probed in the order `functionResponse`, `functionCall`,
    /// `text`; the first one holding the expected shape wins.
    pub fn from_value(value: &Value) -> Self {
        if let Some(resp) = value.get("functionResponse").filter(|v| v.is_object()) {
            let name = resp
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let response = resp.get("response").cloned().unwrap_or(Value::Null);
            return Self::FunctionResponse(FunctionResponse { name, response });
        }

        if let Some(call) = value.get("functionCall").filter(|v| v.is_object()) {
            let name = call
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let args = call.get("args").cloned().unwrap_or(Value::Null);
            return Self::FunctionCall(FunctionCall { name, args });
        }

        if let Some(text) = value.get("text").and_then(|v| v.as_str()) {
            return Self::Text(text.to_string());
        }

        Self::Unknown(value.clone())
    }

    /// Whether this part is worth showing as an assistant message: non-empty
    /// text or a function response.
    pub fn is_displayable(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::FunctionResponse(_) => true,
            Self::FunctionCall(_) | Self::Unknown(_) => false,
        }
    }
}
