//! Callback-style entry points for hosts that cannot `.await`.
//!
//! Each call spawns the async operation on the ambient tokio runtime and hands
//! the result to the closure. Without a runtime the closure is invoked
//! immediately with [`DelightError::UnsupportedPlatform`].

use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::client::DelightClient;
use crate::error::{DelightError, DelightResult};
use crate::models::{ChatSubmitResult, PollResult};
use crate::request::ChatRequest;

impl DelightClient {
    pub fn send_chat_callback<F>(&self, request: ChatRequest, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(DelightResult<ChatSubmitResult>) + Send + 'static,
    {
        let client = self.clone();
        spawn_with_callback(async move { client.send_chat(&request).await }, callback)
    }

    pub fn poll_callback<F>(
        &self,
        poll_path: impl Into<String>,
        max_attempts: u32,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(DelightResult<PollResult>) + Send + 'static,
    {
        let client = self.clone();
        let poll_path = poll_path.into();
        spawn_with_callback(
            async move { client.poll(&poll_path, max_attempts).await },
            callback,
        )
    }

    pub fn send_and_await_reply_callback<F>(
        &self,
        request: ChatRequest,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(DelightResult<PollResult>) + Send + 'static,
    {
        let client = self.clone();
        spawn_with_callback(
            async move { client.send_and_await_reply(&request).await },
            callback,
        )
    }
}

fn spawn_with_callback<T, Fut, F>(operation: Fut, callback: F) -> Option<JoinHandle<()>>
where
    T: Send + 'static,
    Fut: Future<Output = DelightResult<T>> + Send + 'static,
    F: FnOnce(DelightResult<T>) + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn(async move {
            callback(operation.await);
        })),
        Err(e) => {
            callback(Err(DelightError::UnsupportedPlatform(format!(
                "no tokio runtime available: {}",
                e
            ))));
            None
        }
    }
}
