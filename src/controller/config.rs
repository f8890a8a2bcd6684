// src/controller/config.rs

use crate::common::timing;
use core::time::Duration;

/// Attempt budget for one kind of transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            attempt_timeout,
        }
    }

    pub const fn transmit() -> Self {
        RetryPolicy::new(timing::TRANSMIT_ATTEMPTS, timing::TRANSMIT_ATTEMPT_TIMEOUT)
    }

    pub const fn query() -> Self {
        RetryPolicy::new(timing::QUERY_ATTEMPTS, timing::QUERY_ATTEMPT_TIMEOUT)
    }
}

/// What a transmit reports when the device never answers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Surface `IrError::Timeout`.
    #[default]
    Fail,
    /// Report an unconfirmed success. The cache is left untouched.
    AssumeDelivered,
}

/// Runtime settings for a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub transmit: RetryPolicy,
    pub query: RetryPolicy,
    pub write_timeout: Duration,
    pub settle_delay: Duration,
    pub backoff: Duration,
    /// Bytes requested per read, at most [`timing::LINE_CAPACITY`].
    pub read_chunk: usize,
    /// Applies to transmits only. Queries always fail on timeout.
    pub timeout_policy: TimeoutPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            transmit: RetryPolicy::transmit(),
            query: RetryPolicy::query(),
            write_timeout: timing::WRITE_TIMEOUT,
            settle_delay: timing::SETTLE_DELAY,
            backoff: timing::RETRY_BACKOFF,
            read_chunk: timing::READ_CHUNK_SIZE,
            timeout_policy: TimeoutPolicy::Fail,
        }
    }
}

impl LinkConfig {
    pub fn transmit_policy(&mut self, policy: RetryPolicy) -> &mut Self {
        self.transmit = policy;
        self
    }

    pub fn query_policy(&mut self, policy: RetryPolicy) -> &mut Self {
        self.query = policy;
        self
    }

    pub fn write_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.write_timeout = timeout;
        self
    }

    pub fn settle_delay(&mut self, delay: Duration) -> &mut Self {
        self.settle_delay = delay;
        self
    }

    pub fn backoff(&mut self, backoff: Duration) -> &mut Self {
        self.backoff = backoff;
        self
    }

    /// Clamped to `1..=LINE_CAPACITY`.
    pub fn read_chunk(&mut self, bytes: usize) -> &mut Self {
        self.read_chunk = bytes.clamp(1, timing::LINE_CAPACITY);
        self
    }

    pub fn timeout_policy(&mut self, policy: TimeoutPolicy) -> &mut Self {
        self.timeout_policy = policy;
        self
    }
}
