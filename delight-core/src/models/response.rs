use serde::{Deserialize, Serialize};
use std::fmt;

/// Acknowledgement of a submitted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSubmitResult {
    pub text: String,
    #[serde(rename = "shouldEndConversation")]
    pub should_end_conversation: bool,
    /// Server-relative path to poll for the reply.
    #[serde(rename = "poll")]
    pub poll_path: String,
}

/// One answer from the poll endpoint.
///
/// Only a result with `completed == true` is authoritative; `text` and
/// `new_tokens` on an incomplete result are partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResult {
    pub uuid: String,
    pub completed: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub new_tokens: Option<String>,
}

impl PollResult {
    /// The final reply text, if the agent has finished.
    pub fn reply(&self) -> Option<&str> {
        if self.completed {
            self.text.as_deref()
        } else {
            None
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Structured error returned by the server in place of a normal payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl fmt::Display for ApiErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}): {}", self.error_type, self.message)?;
        if let Some(ref code) = self.code {
            write!(f, " [code: {}]", code)?;
        }
        Ok(())
    }
}

/// The `{"error": {...}}` wrapper around [`ApiErrorPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorPayload,
}
