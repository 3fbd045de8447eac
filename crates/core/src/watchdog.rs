// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Animation watchdogs for the two-phase graph transition
//!
//! A watchdog binds a [`CountingJoin`] to a coordinator so that releasing the
//! join calls back into that coordinator:
//!
//! - **Phase 1** ([`Deletion`]) carries the next graph and hands it to
//!   [`TransitionCoordinator::begin_phase2`].
//! - **Phase 2** ([`Addition`]) carries nothing and calls
//!   [`TransitionCoordinator::on_all_animations_finished`].
//!
//! Watchdogs hold a [`Weak`] handle to their coordinator and never keep it
//! alive. At most one cycle may be in flight per watchdog; re-arming early is
//! reported as [`JoinError::AlreadyArmed`].

use crate::clock::{Clock, SystemClock};
use crate::join::{
    Continuation, CountingJoin, JoinConfig, JoinError, JoinProgress, JoinStatus, StallReport,
};
use std::marker::PhantomData;
use std::sync::Weak;

/// Callbacks a coordinator supplies to its watchdogs
pub trait TransitionCoordinator: Send + Sync + 'static {
    /// The graph state handed from phase 1 to phase 2
    type Graph: Send + 'static;

    /// Called once per cycle when all deletion animations have finished, on
    /// the thread of the last deletion signal. Expected to arm or skip the
    /// phase-2 watchdog before returning.
    fn begin_phase2(&self, next: Self::Graph);

    /// Called once per cycle when all add/draw animations have finished
    fn on_all_animations_finished(&self);
}

/// A phase of a graph transition
pub trait Phase<C: TransitionCoordinator>: Send + Sync + 'static {
    type Payload: Send;

    const NAME: &'static str;

    fn complete(coordinator: &C, payload: Self::Payload);
}

/// Phase 1: remove elements absent from the next graph
#[derive(Debug)]
pub struct Deletion;

impl<C: TransitionCoordinator> Phase<C> for Deletion {
    type Payload = C::Graph;

    const NAME: &'static str = "phase1-deletion";

    fn complete(coordinator: &C, next: C::Graph) {
        coordinator.begin_phase2(next);
    }
}

/// Phase 2: add and redraw the elements of the next graph
#[derive(Debug)]
pub struct Addition;

impl<C: TransitionCoordinator> Phase<C> for Addition {
    type Payload = ();

    const NAME: &'static str = "phase2-addition";

    fn complete(coordinator: &C, _: ()) {
        coordinator.on_all_animations_finished();
    }
}

/// Continuation that resolves into a coordinator callback
pub struct CoordinatorLink<C, P> {
    coordinator: Weak<C>,
    phase: PhantomData<fn() -> P>,
}

impl<C: TransitionCoordinator, P: Phase<C>> Continuation for CoordinatorLink<C, P> {
    type Payload = P::Payload;

    fn resume(&self, payload: P::Payload) {
        match self.coordinator.upgrade() {
            Some(coordinator) => P::complete(&coordinator, payload),
            None => tracing::warn!(phase = P::NAME, "coordinator dropped before phase completed"),
        }
    }
}

/// A counting join whose continuation calls back into a coordinator
pub struct AnimationWatchDog<C, P, K = SystemClock>
where
    C: TransitionCoordinator,
    P: Phase<C>,
    K: Clock,
{
    join: CountingJoin<CoordinatorLink<C, P>, K>,
}

/// Watchdog for the deletion phase
pub type Phase1Watchdog<C, K = SystemClock> = AnimationWatchDog<C, Deletion, K>;

/// Watchdog for the add/draw phase
pub type Phase2Watchdog<C, K = SystemClock> = AnimationWatchDog<C, Addition, K>;

impl<C: TransitionCoordinator, P: Phase<C>> AnimationWatchDog<C, P> {
    pub fn new(coordinator: Weak<C>) -> Self {
        Self::with_clock(coordinator, SystemClock)
    }
}

impl<C: TransitionCoordinator, P: Phase<C>, K: Clock> AnimationWatchDog<C, P, K> {
    pub fn with_clock(coordinator: Weak<C>, clock: K) -> Self {
        let link = CoordinatorLink {
            coordinator,
            phase: PhantomData,
        };
        Self {
            join: CountingJoin::with_clock(P::NAME, link, clock),
        }
    }

    pub fn with_config(mut self, config: JoinConfig) -> Self {
        self.join = self.join.with_config(config);
        self
    }

    /// Signal that one animation of this phase has finished
    pub fn finished(&self) -> Result<JoinProgress, JoinError> {
        self.join.signal()
    }

    pub fn status(&self) -> JoinStatus {
        self.join.status()
    }

    pub fn is_idle(&self) -> bool {
        self.join.is_idle()
    }

    pub fn stall(&self) -> Option<StallReport> {
        self.join.stall()
    }
}

impl<C: TransitionCoordinator, K: Clock> AnimationWatchDog<C, Deletion, K> {
    /// Wait for `animations` deletions, then hand `next` to phase 2.
    ///
    /// Zero animations never releases; use [`Self::skip`] instead.
    pub fn await_animations(&self, animations: usize, next: C::Graph) -> Result<(), JoinError> {
        self.join.arm(animations, next)
    }

    /// Nothing to delete: hand `next` to phase 2 immediately
    pub fn skip(&self, next: C::Graph) -> Result<(), JoinError> {
        self.join.skip(next)
    }
}

impl<C: TransitionCoordinator, K: Clock> AnimationWatchDog<C, Addition, K> {
    /// Wait for `animations` additions, then report the transition finished.
    ///
    /// Zero animations never releases; use [`Self::skip`] instead.
    pub fn await_animations(&self, animations: usize) -> Result<(), JoinError> {
        self.join.arm(animations, ())
    }

    /// Nothing to draw: report the transition finished immediately
    pub fn skip(&self) -> Result<(), JoinError> {
        self.join.skip(())
    }
}

impl<C, P, K> std::fmt::Debug for AnimationWatchDog<C, P, K>
where
    C: TransitionCoordinator,
    P: Phase<C>,
    K: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationWatchDog")
            .field("join", &self.join)
            .finish()
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
