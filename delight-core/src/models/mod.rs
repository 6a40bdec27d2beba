mod message;
mod response;

pub use message::{ChatEnvelope, ChatMessage, Sender, DEFAULT_LANGUAGE_CODE};
pub use response::{ApiErrorEnvelope, ApiErrorPayload, ChatSubmitResult, PollResult};
