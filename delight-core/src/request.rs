//! Outbound chat message construction.
//!
//! Message ids and timestamps come from injectable strategies so request
//! bodies can be asserted byte-for-byte in tests.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{ChatMessage, Sender};

pub const DEFAULT_MESSAGE_ID_PREFIX: &str = "Wi-rs-";

/// Produces ids for messages sent without a caller-supplied id.
pub trait MessageIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// `{prefix}{UUID v4}` ids, upper-case and hyphenated.
#[derive(Debug, Clone)]
pub struct UuidMessageIds {
    prefix: String,
}

impl UuidMessageIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidMessageIds {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_ID_PREFIX)
    }
}

impl MessageIdGenerator for UuidMessageIds {
    fn next_id(&self) -> String {
        let id = Uuid::new_v4().hyphenated().to_string().to_uppercase();
        format!("{}{}", self.prefix, id)
    }
}

/// Deterministic `{prefix}{n}` ids, counting up from 1.
#[derive(Debug)]
pub struct SequentialMessageIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialMessageIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl MessageIdGenerator for SequentialMessageIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Caller-supplied fields for one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub text: String,
    pub webhook_id: String,
    pub user_id: String,
    pub username: String,
    pub message_id: Option<String>,
}

impl ChatRequest {
    pub fn new(
        text: impl Into<String>,
        webhook_id: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            webhook_id: webhook_id.into(),
            user_id: user_id.into(),
            username: username.into(),
            message_id: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}

/// Turns a [`ChatRequest`] into the [`ChatMessage`] that goes on the wire.
#[derive(Clone)]
pub struct ChatRequestBuilder {
    ids: Arc<dyn MessageIdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ChatRequestBuilder {
    pub fn new(ids: Arc<dyn MessageIdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new(Arc::new(UuidMessageIds::new(prefix)), Arc::new(SystemClock))
    }

    pub fn build(&self, request: &ChatRequest) -> ChatMessage {
        let message_id = request
            .message_id
            .clone()
            .unwrap_or_else(|| self.ids.next_id());

        ChatMessage::new(
            message_id,
            Sender::new(request.user_id.clone(), request.username.clone()),
            self.clock.now_millis(),
            request.text.clone(),
        )
    }
}

impl Default for ChatRequestBuilder {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_MESSAGE_ID_PREFIX)
    }
}

impl std::fmt::Debug for ChatRequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequestBuilder").finish_non_exhaustive()
    }
}
