//! Bounded exponential backoff used while waiting for the diagram container
//! to be laid out by the surrounding page.
//!
//! The container of an embedded frame often reports `clientWidth == 0` for a
//! few frames after load. Fitting the viewport at that point produces a zero
//! scale, so view initialization is deferred until the width is non-zero.

use gloo_timers::future::TimeoutFuture;
use serde::Deserialize;

use crate::constants::{LAYOUT_RETRY_INITIAL_MS, LAYOUT_RETRY_MAX_ATTEMPTS, LAYOUT_RETRY_MAX_MS};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Delay before the first re-check, in milliseconds
    pub initial_delay_ms: u32,
    /// Upper bound for a single delay, in milliseconds
    pub max_delay_ms: u32,
    /// Maximum number of re-checks (None for infinite)
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: LAYOUT_RETRY_INITIAL_MS,
            max_delay_ms: LAYOUT_RETRY_MAX_MS,
            max_attempts: Some(LAYOUT_RETRY_MAX_ATTEMPTS),
        }
    }
}

impl RetryPolicy {
    /// Delay before re-check number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> u32 {
        let delay = self
            .initial_delay_ms
            .saturating_mul(2_u32.pow(attempt.min(10))); // Prevent overflow with min(10)
        delay.min(self.max_delay_ms.max(self.initial_delay_ms))
    }

    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Outcome of one readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The condition holds; run initialization now.
    Ready,
    /// Check again after `delay_ms`.
    Retry { attempt: u32, delay_ms: u32 },
    /// The policy ran out of attempts.
    Exhausted,
    /// `Ready` was already reported; nothing left to do.
    Finished,
}

/// Pure state machine behind [`wait_until`]; kept separate so the retry
/// sequence can be tested without timers.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    policy: RetryPolicy,
    attempt: u32,
    done: bool,
}

impl ReadinessProbe {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempt: 0,
            done: false,
        }
    }

    pub fn observe(&mut self, ready: bool) -> Readiness {
        if self.done {
            return Readiness::Finished;
        }
        if ready {
            self.done = true;
            return Readiness::Ready;
        }
        if !self.policy.allows(self.attempt) {
            self.done = true;
            return Readiness::Exhausted;
        }
        let attempt = self.attempt;
        self.attempt += 1;
        Readiness::Retry {
            attempt,
            delay_ms: self.policy.delay_for(attempt),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

/// Poll `ready` with backoff until it returns true (`true`) or the policy is
/// exhausted (`false`). Yields to the event loop between checks.
pub async fn wait_until<F>(policy: &RetryPolicy, mut ready: F) -> bool
where
    F: FnMut() -> bool,
{
    let mut probe = ReadinessProbe::new(policy.clone());
    loop {
        match probe.observe(ready()) {
            Readiness::Ready => return true,
            Readiness::Retry { delay_ms, .. } => TimeoutFuture::new(delay_ms).await,
            Readiness::Exhausted | Readiness::Finished => return false,
        }
    }
}
