use serde::{Deserialize, Serialize};

/// Language code sent with every outbound message.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Who sent a chat message. Serialized as the `from` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    pub username: String,
    pub language_code: String,
}

impl Sender {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }
}

/// An outbound chat message, built fresh for every send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: String,
    #[serde(rename = "from")]
    pub sender: Sender,
    #[serde(rename = "date")]
    pub timestamp_millis: i64,
    pub text: String,
}

impl ChatMessage {
    pub fn new(
        message_id: impl Into<String>,
        sender: Sender,
        timestamp_millis: i64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            sender,
            timestamp_millis,
            text: text.into(),
        }
    }

    /// Wrap the message in the `{"message": ...}` body the webhook expects.
    pub fn into_envelope(self) -> ChatEnvelope {
        ChatEnvelope { message: self }
    }
}

/// Request body for the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sender_defaults_to_english() {
        let sender = Sender::new("user-1", "alice");
        assert_eq!(sender.language_code, "en");
    }

    #[test]
    fn test_envelope_wire_format() {
        let message = ChatMessage::new(
            "msg-1",
            Sender::new("user-1", "alice"),
            1_707_300_000_000,
            "hello",
        );

        let value = serde_json::to_value(message.into_envelope()).unwrap();
        assert_eq!(
            value,
            json!({
                "message": {
                    "message_id": "msg-1",
                    "from": {
                        "id": "user-1",
                        "username": "alice",
                        "language_code": "en"
                    },
                    "date": 1_707_300_000_000_i64,
                    "text": "hello"
                }
            })
        );
    }

    #[test]
    fn test_field_order_is_stable() {
        let message = ChatMessage::new("m", Sender::new("u", "n"), 1, "t");
        let body = serde_json::to_string(&message.into_envelope()).unwrap();
        assert_eq!(
            body,
            r#"{"message":{"message_id":"m","from":{"id":"u","username":"n","language_code":"en"},"date":1,"text":"t"}}"#
        );
    }
}
