//! Client SDK for the Delight conversational agent API.
//!
//! ```no_run
//! use delight_core::{ChatRequest, ClientConfig, DelightClient};
//!
//! # async fn run() -> delight_core::DelightResult<()> {
//! let client = DelightClient::new(ClientConfig::default_config())?;
//! let reply = client
//!     .send_and_await_reply(&ChatRequest::new("Hi!", "my-agent", "user-1", "alice"))
//!     .await?;
//! println!("{}", reply.reply().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod request;
pub mod testkit;
pub mod transport;

pub use client::{
    poll_url, webhook_url, DelightClient, PollOptions, RecordingSleeper, Sleeper, TokioSleeper,
};
pub use config::{
    ensure_config_dir, get_config_dir, get_config_paths, ClientConfig, DelightConfig,
    LoggingConfig, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS,
};
pub use error::{CliErrorDisplay, DelightError, DelightResult};
pub use models::{
    ApiErrorEnvelope, ApiErrorPayload, ChatEnvelope, ChatMessage, ChatSubmitResult, PollResult,
    Sender,
};
pub use request::{
    ChatRequest, ChatRequestBuilder, Clock, FixedClock, MessageIdGenerator, SequentialMessageIds,
    SystemClock, UuidMessageIds, DEFAULT_MESSAGE_ID_PREFIX,
};
pub use tokio_util::sync::CancellationToken;
pub use transport::{
    HttpMethod, HttpTransport, ReqwestTransport, TransportRequest, TransportResponse,
};
