//! Error types for the Delight core library.
//!
//! Every operation of the client returns a [`DelightResult`]. Nothing is retried
//! behind the caller's back except the reply polling loop, and that loop only
//! retries on "not completed yet" unless transient retries are opted in.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Url | Base URL, webhook id and poll path resolution errors |
//! | E2001-E2099 | Chat | Transport, decoding, API and polling errors |
//! | E3001-E3099 | Platform | Missing runtime capabilities |
//! | E4001-E4099 | Config | Config file, environment and validation errors |
//! | E9001-E9099 | General | Internal and serialization errors |

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ApiErrorPayload;

/// The main error type for the Delight core library.
#[derive(Debug, Error)]
pub enum DelightError {
    // ========================================================================
    // URL Errors (E1001-E1099)
    // ========================================================================
    /// The base URL, webhook id or poll path did not form a valid URL
    #[error("[E1001] Invalid URL: {0}")]
    InvalidUrl(String),

    // ========================================================================
    // Chat Errors (E2001-E2099)
    // ========================================================================
    /// Transport-level failure (DNS, connection, timeout)
    #[error("[E2001] Request failed: {message}")]
    RequestFailed { message: String, transient: bool },

    /// The response body did not have the expected shape
    #[error("[E2002] Failed to decode response: {0}")]
    DecodingFailed(String),

    /// The server answered with a structured error payload
    #[error("[E2003] API error {0}")]
    Api(ApiErrorPayload),

    /// The poll budget was consumed without the reply completing
    #[error("[E2004] Reply not completed after {attempts} poll attempts")]
    AttemptsExhausted { attempts: u32 },

    /// The caller cancelled the operation
    #[error("[E2005] Operation cancelled")]
    Cancelled,

    /// The polling phase ran past its wall-clock deadline
    #[error("[E2006] Reply not completed within {0:?}")]
    DeadlineExceeded(Duration),

    // ========================================================================
    // Platform Errors (E3001-E3099)
    // ========================================================================
    /// The environment lacks a capability the client needs
    #[error("[E3001] Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    // ========================================================================
    // Configuration Errors (E4001-E4099)
    // ========================================================================
    /// Configuration error (generic)
    #[error("[E4001] Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value
    #[error("[E4002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Configuration file parse error
    #[error("[E4003] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// Serialization error on the outbound side
    #[error("[E9002] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Delight operations.
pub type DelightResult<T> = Result<T, DelightError>;

impl DelightError {
    /// Create a request error that should not be retried.
    pub fn request_failed(message: impl Into<String>) -> Self {
        DelightError::RequestFailed {
            message: message.into(),
            transient: false,
        }
    }

    /// Create a request error that may succeed on retry.
    pub fn transient_request_failed(message: impl Into<String>) -> Self {
        DelightError::RequestFailed {
            message: message.into(),
            transient: true,
        }
    }
}

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for DelightError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            DelightError::transient_request_failed(err.to_string())
        } else if err.is_builder() {
            DelightError::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            DelightError::DecodingFailed(err.to_string())
        } else {
            DelightError::request_failed(err.to_string())
        }
    }
}

impl From<config::ConfigError> for DelightError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => DelightError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => DelightError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => DelightError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => DelightError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl DelightError {
    /// Returns true if this error came from talking to the chat API.
    pub fn is_chat_error(&self) -> bool {
        matches!(
            self,
            DelightError::RequestFailed { .. }
                | DelightError::DecodingFailed(_)
                | DelightError::Api(_)
                | DelightError::AttemptsExhausted { .. }
                | DelightError::Cancelled
                | DelightError::DeadlineExceeded(_)
        )
    }

    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DelightError::Config(_)
                | DelightError::InvalidConfigValue { .. }
                | DelightError::ConfigParseError(_)
        )
    }

    /// Returns true if this error is transient and the operation might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            DelightError::RequestFailed { transient, .. } => *transient,
            DelightError::AttemptsExhausted { .. } | DelightError::DeadlineExceeded(_) => true,
            _ => false,
        }
    }

    /// The server payload when this is an API error.
    pub fn api_payload(&self) -> Option<&ApiErrorPayload> {
        match self {
            DelightError::Api(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            DelightError::InvalidUrl(_) => "E1001",
            DelightError::RequestFailed { .. } => "E2001",
            DelightError::DecodingFailed(_) => "E2002",
            DelightError::Api(_) => "E2003",
            DelightError::AttemptsExhausted { .. } => "E2004",
            DelightError::Cancelled => "E2005",
            DelightError::DeadlineExceeded(_) => "E2006",
            DelightError::UnsupportedPlatform(_) => "E3001",
            DelightError::Config(_) => "E4001",
            DelightError::InvalidConfigValue { .. } => "E4002",
            DelightError::ConfigParseError(_) => "E4003",
            DelightError::Internal(_) => "E9001",
            DelightError::SerializationError(_) => "E9002",
        }
    }

    /// Short name of the error kind, stable across message changes.
    pub fn kind(&self) -> &'static str {
        match self {
            DelightError::InvalidUrl(_) => "InvalidUrl",
            DelightError::RequestFailed { .. } => "RequestError",
            DelightError::DecodingFailed(_) => "DecodingError",
            DelightError::Api(_) => "ApiError",
            DelightError::AttemptsExhausted { .. } => "AttemptsExhausted",
            DelightError::Cancelled => "Cancelled",
            DelightError::DeadlineExceeded(_) => "DeadlineExceeded",
            DelightError::UnsupportedPlatform(_) => "UnsupportedPlatform",
            DelightError::Config(_)
            | DelightError::InvalidConfigValue { .. }
            | DelightError::ConfigParseError(_) => "ConfigError",
            DelightError::Internal(_) => "Internal",
            DelightError::SerializationError(_) => "SerializationError",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            DelightError::InvalidUrl(_) => {
                Some("Check the base URL and make sure the webhook id has no reserved characters")
            }
            DelightError::RequestFailed { .. } => {
                Some("Check your network connection and that the base URL is reachable")
            }
            DelightError::DecodingFailed(_) => {
                Some("The server answered with an unexpected payload; check the base URL")
            }
            DelightError::AttemptsExhausted { .. } | DelightError::DeadlineExceeded(_) => {
                Some("The agent is still working. Try again later or raise --max-attempts")
            }
            DelightError::InvalidConfigValue { .. } | DelightError::ConfigParseError(_) => {
                Some("Run 'delight config show' to inspect the effective configuration")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with suggestions.
pub struct CliErrorDisplay<'a> {
    error: &'a DelightError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a DelightError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let DelightError::Api(payload) = self.error {
            if let Some(ref param) = payload.param {
                write!(f, "\n  Parameter: {}", param)?;
            }
        }

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                write!(f, "\n\n  Suggestion: {}", suggestion)?;
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
