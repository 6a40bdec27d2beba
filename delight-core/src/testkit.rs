//! In-memory collaborators for exercising [`crate::DelightClient`] without a
//! network.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{DelightError, DelightResult};
use crate::transport::{HttpTransport, TransportRequest, TransportResponse};

/// Replays queued responses in order and records every request it sees.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<DelightResult<TransportResponse>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: DelightResult<TransportResponse>) -> &Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(response);
        }
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(TransportResponse::new(status, body.to_string())))
    }

    pub fn push_raw(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(TransportResponse::new(status, body)))
    }

    pub fn push_error(&self, error: DelightError) -> &Self {
        self.push(Err(error))
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: TransportRequest) -> DelightResult<TransportResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        self.script
            .lock()
            .map_err(|_| DelightError::Internal("scripted transport poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| {
                Err(DelightError::Internal(
                    "no scripted response left".to_string(),
                ))
            })
    }
}

/// `{"uuid": .., "completed": .., "text": .., "new_tokens": null}`
pub fn poll_body(uuid: &str, completed: bool, text: Option<&str>) -> Value {
    serde_json::json!({
        "uuid": uuid,
        "completed": completed,
        "text": text,
        "new_tokens": null,
    })
}

/// `{"text": .., "shouldEndConversation": false, "poll": ..}`
pub fn submit_body(text: &str, poll_path: &str) -> Value {
    serde_json::json!({
        "text": text,
        "shouldEndConversation": false,
        "poll": poll_path,
    })
}

/// `{"error": {"message": .., "type": .., "param": null, "code": ..}}`
pub fn error_body(message: &str, error_type: &str, code: Option<&str>) -> Value {
    serde_json::json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": null,
            "code": code,
        }
    })
}
