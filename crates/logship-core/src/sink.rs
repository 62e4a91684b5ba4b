//! IndexSink — reliable delivery of [`Document`]s to a [`DocumentStore`].
//!
//! The store client makes exactly one attempt per call; [`IndexSink`] owns
//! the retry decision. Transient failures back off exponentially up to
//! [`RetryPolicy::max_attempts`], store-side rejections are returned at once.
//!
//! Delivery is at-least-once. If the store applies a write but the reply is
//! lost, the retry indexes the document again; a deterministic document id
//! turns that second write into an overwrite.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetrySettings;
use crate::error::IndexError;
use crate::types::{Ack, Document};

/// A document store client.
pub trait DocumentStore: Send {
    /// Establish (or verify) the connection. Failure is
    /// [`IndexError::SinkUnavailable`].
    fn connect(&mut self) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Make one indexing attempt. `id` is `None` when the store should assign one.
    fn index(
        &mut self,
        document: &Document,
        id: Option<&str>,
    ) -> impl Future<Output = Result<Ack, IndexError>> + Send;

    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Never zero.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Delay before attempt `failed + 1`, after `failed` failures (`failed >= 1`).
    pub fn backoff(&self, failed: u32) -> Duration {
        let exponent = failed.saturating_sub(1).min(31);
        self.initial_backoff
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200), Duration::from_secs(5))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.initial_backoff_ms),
            Duration::from_millis(settings.max_backoff_ms),
        )
    }
}

/// Wraps a [`DocumentStore`] with the retry policy.
#[derive(Debug)]
pub struct IndexSink<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: DocumentStore> IndexSink<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn connect(&mut self) -> Result<(), IndexError> {
        self.store.connect().await
    }

    /// Deliver one document, retrying transient failures.
    ///
    /// Returns the last transient error once the attempts are spent.
    pub async fn submit(&mut self, document: &Document, id: Option<&str>) -> Result<Ack, IndexError> {
        let mut attempt = 1;
        loop {
            match self.store.index(document, id).await {
                Ok(ack) => {
                    debug!(attempt, ack = %ack, "document indexed");
                    return Ok(ack);
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient index failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(attempt, error = %err, "retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    pub async fn close(&mut self) {
        self.store.close().await;
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
