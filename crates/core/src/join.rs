// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counting join: arm with N, signal N times, continue exactly once
//!
//! A fan-in barrier that knows nothing about animations or phases. The
//! continuation is supplied through the [`Continuation`] trait and receives
//! the payload that was recorded when the join was armed.
//!
//! Arming with zero does not fire the continuation. Use [`CountingJoin::skip`]
//! when there is nothing to wait for.
//!
//! There is no liveness guarantee: a join that receives fewer signals than it
//! was armed for waits forever. [`CountingJoin::stall`] reports such joins
//! when a stall threshold is configured.

use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Action run when an armed join reaches zero
pub trait Continuation: Send + Sync {
    /// Value recorded at arm time and handed over on release
    type Payload: Send;

    fn resume(&self, payload: Self::Payload);
}

/// Errors raised by misuse of a join.
///
/// Both variants mean the caller's accounting of started work is wrong.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("join '{name}' signalled more often than armed (generation {generation})")]
    OverSignal { name: String, generation: u64 },
    #[error("join '{name}' re-armed with {remaining} signal(s) outstanding (generation {generation})")]
    AlreadyArmed {
        name: String,
        remaining: usize,
        generation: u64,
    },
}

/// Join configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// How long an armed join may wait before it is reported as stalled
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub stall_threshold: Option<Duration>,
}

impl JoinConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stall_threshold(mut self, threshold: Duration) -> Self {
        self.stall_threshold = Some(threshold);
        self
    }
}

/// Outcome of a single signal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum JoinProgress {
    /// Still waiting for `remaining` signals
    Pending { remaining: usize },
    /// This signal released the join and the continuation has run
    Released { generation: u64 },
}

/// Point-in-time view of a join
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinStatus {
    pub name: String,
    pub generation: u64,
    pub expected: usize,
    pub remaining: usize,
}

impl JoinStatus {
    pub fn is_idle(&self) -> bool {
        self.remaining == 0
    }
}

/// An armed join that has waited longer than its stall threshold
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StallReport {
    pub name: String,
    pub generation: u64,
    pub expected: usize,
    pub remaining: usize,
    pub waited: Duration,
}

impl std::fmt::Display for StallReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "join '{}' stalled: {}/{} signal(s) outstanding after {:?} (generation {})",
            self.name, self.remaining, self.expected, self.waited, self.generation
        )
    }
}

/// Counter state, exclusively owned by one join
#[derive(Debug)]
struct JoinCounter<P> {
    expected: usize,
    remaining: usize,
    generation: u64,
    armed_at: Option<Instant>,
    pending: Option<P>,
}

/// Result of decrementing a counter
enum Decrement<P> {
    Pending(usize),
    Released(Option<P>),
}

impl<P> JoinCounter<P> {
    fn new() -> Self {
        Self {
            expected: 0,
            remaining: 0,
            generation: 0,
            armed_at: None,
            pending: None,
        }
    }

    /// Start a new cycle. Refused while the previous cycle is in flight.
    fn arm(&mut self, expected: usize, payload: P, now: Instant) -> Result<(), usize> {
        if self.remaining > 0 {
            return Err(self.remaining);
        }
        self.generation += 1;
        self.expected = expected;
        self.remaining = expected;
        self.armed_at = Some(now);
        self.pending = Some(payload);
        Ok(())
    }

    /// `None` when the counter is already zero
    fn decrement(&mut self) -> Option<Decrement<P>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.remaining > 0 {
            return Some(Decrement::Pending(self.remaining));
        }
        self.armed_at = None;
        Some(Decrement::Released(self.pending.take()))
    }
}

/// Fan-in barrier with a continuation.
///
/// Arm, decrement and the zero test run under one lock; the continuation
/// runs after the lock is released, on the thread of the releasing signal.
/// The continuation may therefore arm this or any other join.
pub struct CountingJoin<K: Continuation, C: Clock = SystemClock> {
    name: String,
    config: JoinConfig,
    counter: Mutex<JoinCounter<K::Payload>>,
    continuation: K,
    clock: C,
}

impl<K: Continuation> CountingJoin<K> {
    pub fn new(name: impl Into<String>, continuation: K) -> Self {
        Self::with_clock(name, continuation, SystemClock)
    }
}

impl<K: Continuation, C: Clock> CountingJoin<K, C> {
    pub fn with_clock(name: impl Into<String>, continuation: K, clock: C) -> Self {
        Self {
            name: name.into(),
            config: JoinConfig::default(),
            counter: Mutex::new(JoinCounter::new()),
            continuation,
            clock,
        }
    }

    pub fn with_config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn continuation(&self) -> &K {
        &self.continuation
    }

    fn counter(&self) -> MutexGuard<'_, JoinCounter<K::Payload>> {
        self.counter.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arm the join for `expected` signals, recording `payload` for the
    /// continuation. Never fires the continuation, even for zero.
    pub fn arm(&self, expected: usize, payload: K::Payload) -> Result<(), JoinError> {
        let mut counter = self.counter();
        counter
            .arm(expected, payload, self.clock.now())
            .map_err(|remaining| self.already_armed(remaining, counter.generation))?;

        if expected == 0 {
            tracing::warn!(
                name = %self.name,
                generation = counter.generation,
                "join armed with zero signals; it will not release until skipped"
            );
        } else {
            tracing::debug!(
                name = %self.name,
                generation = counter.generation,
                expected,
                "join armed"
            );
        }
        Ok(())
    }

    /// Record one completion. The signal that brings the count to zero runs
    /// the continuation before returning.
    ///
    /// A signal on an idle join is a caller bug. It is reported as
    /// [`JoinError::OverSignal`] rather than aborting; the counter stays at
    /// zero and no continuation runs.
    pub fn signal(&self) -> Result<JoinProgress, JoinError> {
        let mut counter = self.counter();
        let generation = counter.generation;
        match counter.decrement() {
            None => {
                drop(counter);
                tracing::error!(name = %self.name, generation, "join over-signalled");
                Err(JoinError::OverSignal {
                    name: self.name.clone(),
                    generation,
                })
            }
            Some(Decrement::Pending(remaining)) => {
                tracing::trace!(name = %self.name, generation, remaining, "join signalled");
                Ok(JoinProgress::Pending { remaining })
            }
            Some(Decrement::Released(payload)) => {
                drop(counter);
                self.release(generation, payload);
                Ok(JoinProgress::Released { generation })
            }
        }
    }

    /// Equivalent to `arm(1, payload)` followed by `signal()`, performed as
    /// one step. Fires the continuation before returning.
    pub fn skip(&self, payload: K::Payload) -> Result<(), JoinError> {
        let mut counter = self.counter();
        counter
            .arm(1, payload, self.clock.now())
            .map_err(|remaining| self.already_armed(remaining, counter.generation))?;
        let generation = counter.generation;
        let payload = match counter.decrement() {
            Some(Decrement::Released(payload)) => payload,
            _ => None,
        };
        drop(counter);

        tracing::debug!(name = %self.name, generation, "join skipped");
        self.release(generation, payload);
        Ok(())
    }

    pub fn status(&self) -> JoinStatus {
        let counter = self.counter();
        JoinStatus {
            name: self.name.clone(),
            generation: counter.generation,
            expected: counter.expected,
            remaining: counter.remaining,
        }
    }

    /// True when no cycle is in flight
    pub fn is_idle(&self) -> bool {
        self.counter().remaining == 0
    }

    /// Report this join if it has been armed longer than the stall threshold
    pub fn stall(&self) -> Option<StallReport> {
        let threshold = self.config.stall_threshold?;
        let counter = self.counter();
        if counter.remaining == 0 {
            return None;
        }
        let waited = self.clock.elapsed_since(counter.armed_at?);
        (waited > threshold).then(|| StallReport {
            name: self.name.clone(),
            generation: counter.generation,
            expected: counter.expected,
            remaining: counter.remaining,
            waited,
        })
    }

    fn release(&self, generation: u64, payload: Option<K::Payload>) {
        match payload {
            Some(payload) => {
                tracing::debug!(name = %self.name, generation, "join released");
                self.continuation.resume(payload);
            }
            None => {
                tracing::error!(name = %self.name, generation, "join released without a payload");
            }
        }
    }

    fn already_armed(&self, remaining: usize, generation: u64) -> JoinError {
        tracing::error!(
            name = %self.name,
            generation,
            remaining,
            "join re-armed while in flight"
        );
        JoinError::AlreadyArmed {
            name: self.name.clone(),
            remaining,
            generation,
        }
    }
}

impl<K: Continuation, C: Clock> std::fmt::Debug for CountingJoin<K, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status();
        f.debug_struct("CountingJoin")
            .field("name", &status.name)
            .field("generation", &status.generation)
            .field("expected", &status.expected)
            .field("remaining", &status.remaining)
            .finish()
    }
}

#[cfg(test)]
#[path = "join_tests.rs"]
mod tests;
