//! Send-then-poll chat workflow.
//!
//! A chat turn is two phases: the message is POSTed to the agent's webhook,
//! which answers with a poll path; the poll path is then fetched at a fixed
//! interval until the reply is marked completed or the attempt budget runs
//! out. Only "not completed yet" triggers another attempt. Transport and
//! decoding failures end the workflow immediately unless transient retries
//! are enabled in [`PollOptions`].

mod polling;
mod urls;

pub use polling::{PollOptions, RecordingSleeper, Sleeper, TokioSleeper};
pub use urls::{poll_url, webhook_url};

use reqwest::Url;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{DelightError, DelightResult};
use crate::models::{ApiErrorEnvelope, ChatSubmitResult, PollResult};
use crate::request::{ChatRequest, ChatRequestBuilder};
use crate::transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};

/// Client for the Delight chat API.
///
/// Cheap to clone; clones share the transport, sleeper and request builder.
#[derive(Clone)]
pub struct DelightClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    builder: ChatRequestBuilder,
    sleeper: Arc<dyn Sleeper>,
}

impl DelightClient {
    /// Build a client with the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> DelightResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> DelightResult<Self> {
        config.validate()?;
        let builder = ChatRequestBuilder::with_prefix(config.message_id_prefix.clone());
        Ok(Self {
            config,
            transport,
            builder,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    pub fn with_request_builder(mut self, builder: ChatRequestBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Poll options derived from the client configuration.
    pub fn poll_options(&self) -> PollOptions {
        PollOptions::from(&self.config)
    }

    /// Submit a chat message and return the server's acknowledgement.
    pub async fn send_chat(&self, request: &ChatRequest) -> DelightResult<ChatSubmitResult> {
        self.send_chat_with(request, &CancellationToken::new()).await
    }

    pub async fn send_chat_with(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> DelightResult<ChatSubmitResult> {
        let url = webhook_url(&self.config.base_url, &request.webhook_id)?;
        let message = self.builder.build(request);
        let message_id = message.message_id.clone();
        let body = serde_json::to_vec(&message.into_envelope())
            .map_err(|e| DelightError::SerializationError(e.to_string()))?;

        info!(
            message_id = %message_id,
            webhook_id = %request.webhook_id,
            "Submitting chat message"
        );

        let response =
            cancellable(cancel, self.transport.execute(TransportRequest::post_json(url, body)))
                .await?;
        let result: ChatSubmitResult = decode_body(&response)?;

        debug!(
            message_id = %message_id,
            poll_path = %result.poll_path,
            should_end = result.should_end_conversation,
            "Chat message accepted"
        );

        Ok(result)
    }

    /// Fetch the poll path once, completed or not.
    pub async fn poll_once(&self, poll_path: &str) -> DelightResult<PollResult> {
        let url = poll_url(&self.config.base_url, poll_path)?;
        self.fetch_poll(&url, &CancellationToken::new()).await
    }

    /// Poll until the reply completes or `max_attempts` requests were spent.
    pub async fn poll(&self, poll_path: &str, max_attempts: u32) -> DelightResult<PollResult> {
        let options = self.poll_options().with_max_attempts(max_attempts);
        self.poll_with(poll_path, &options, &CancellationToken::new())
            .await
    }

    pub async fn poll_with(
        &self,
        poll_path: &str,
        options: &PollOptions,
        cancel: &CancellationToken,
    ) -> DelightResult<PollResult> {
        let url = poll_url(&self.config.base_url, poll_path)?;

        match options.deadline {
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.poll_loop(&url, options, cancel)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(url = %url, "Polling deadline of {:?} exceeded", deadline);
                        Err(DelightError::DeadlineExceeded(deadline))
                    }
                }
            }
            None => self.poll_loop(&url, options, cancel).await,
        }
    }

    /// Submit a chat message and wait for the agent's completed reply,
    /// using the configured attempt budget.
    pub async fn send_and_await_reply(&self, request: &ChatRequest) -> DelightResult<PollResult> {
        self.send_and_await_reply_with(request, &self.poll_options(), &CancellationToken::new())
            .await
    }

    pub async fn send_and_await_reply_with(
        &self,
        request: &ChatRequest,
        options: &PollOptions,
        cancel: &CancellationToken,
    ) -> DelightResult<PollResult> {
        let submitted = self.send_chat_with(request, cancel).await?;
        let result = self
            .poll_with(&submitted.poll_path, options, cancel)
            .await?;

        info!(uuid = %result.uuid, "Reply completed");
        Ok(result)
    }

    async fn poll_loop(
        &self,
        url: &Url,
        options: &PollOptions,
        cancel: &CancellationToken,
    ) -> DelightResult<PollResult> {
        let mut remaining = options.max_attempts;

        loop {
            if remaining == 0 {
                let err = DelightError::AttemptsExhausted {
                    attempts: options.max_attempts,
                };
                err.log();
                return Err(err);
            }

            let attempt = options.max_attempts - remaining + 1;
            debug!(url = %url, attempt, "Polling for reply");

            match self.fetch_poll(url, cancel).await {
                Ok(result) if result.completed => return Ok(result),
                Ok(result) => {
                    debug!(uuid = %result.uuid, attempt, "Reply not completed yet");
                }
                Err(err @ DelightError::RequestFailed { transient: true, .. })
                    if options.retry_transient_errors =>
                {
                    warn!(attempt, "Poll attempt failed ({}), retrying", err);
                }
                Err(err) => return Err(err),
            }

            cancellable(cancel, async {
                self.sleeper.sleep(options.interval).await;
                Ok(())
            })
            .await?;
            remaining -= 1;
        }
    }

    async fn fetch_poll(&self, url: &Url, cancel: &CancellationToken) -> DelightResult<PollResult> {
        let response =
            cancellable(cancel, self.transport.execute(TransportRequest::get(url.clone())))
                .await?;
        decode_body(&response)
    }
}

impl std::fmt::Debug for DelightClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelightClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Decode a response body, giving a structured server error precedence over
/// the expected payload.
fn decode_body<T: DeserializeOwned>(response: &TransportResponse) -> DelightResult<T> {
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(&response.body) {
        warn!(
            status = response.status,
            error_type = %envelope.error.error_type,
            "Server returned an error payload: {}",
            envelope.error.message
        );
        return Err(DelightError::Api(envelope.error));
    }

    serde_json::from_slice(&response.body).map_err(|e| {
        DelightError::DecodingFailed(format!("{} (HTTP status {})", e, response.status))
    })
}

async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> DelightResult<T>
where
    F: Future<Output = DelightResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DelightError::Cancelled),
        result = fut => result,
    }
}
