use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::ClientConfig;

/// How the reply polling loop behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Number of poll requests before giving up.
    pub max_attempts: u32,
    /// Fixed delay after every incomplete answer.
    pub interval: Duration,
    /// Keep polling through connect errors and timeouts, spending one
    /// attempt each. Off by default: a transport error ends the loop.
    pub retry_transient_errors: bool,
    /// Wall-clock bound for the whole polling phase.
    pub deadline: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for PollOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            interval: config.poll_interval(),
            retry_transient_errors: config.retry_transient_errors,
            deadline: config.deadline(),
        }
    }
}

impl PollOptions {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_transient_retries(mut self, enabled: bool) -> Self {
        self.retry_transient_errors = enabled;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// The delay between poll attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every requested delay.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.calls().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(duration);
        }
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let mut config = ClientConfig::default();
        config.max_attempts = 60;
        config.poll_interval_ms = 500;
        config.deadline_secs = Some(45);

        let options = PollOptions::from(&config);
        assert_eq!(options.max_attempts, 60);
        assert_eq!(options.interval, Duration::from_millis(500));
        assert!(!options.retry_transient_errors);
        assert_eq!(options.deadline, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_default_options() {
        let options = PollOptions::default();
        assert_eq!(options.max_attempts, 30);
        assert_eq!(options.interval, Duration::from_secs(1));
        assert!(options.deadline.is_none());
    }

    #[tokio::test]
    async fn test_recording_sleeper() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_secs(1)).await;
        sleeper.sleep(Duration::from_secs(2)).await;
        assert_eq!(
            sleeper.calls(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(sleeper.total(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_waits() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(1)).await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }
}
