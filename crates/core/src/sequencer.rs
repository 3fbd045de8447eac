// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graph transition sequencer
//!
//! Drives an [`AnimationHost`] through the two-phase transition from the
//! graph currently shown to the next one: first all removal animations run to
//! completion, then all addition animations, then the host is told the
//! transition is finished. New transitions are refused while one is running.
//!
//! Animations are started with no lock held, so an animation that completes
//! synchronously inside [`Animation::start`] may drive the cycle re-entrantly.
//! Finish listeners run the same way, so one may start the next transition.

use crate::clock::{Clock, SystemClock};
use crate::cycle::{CycleError, CycleInput, CyclePhase, TransitionCycle};
use crate::join::{JoinConfig, JoinError, JoinStatus, StallReport};
use crate::watchdog::{Phase1Watchdog, Phase2Watchdog, TransitionCoordinator};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use thiserror::Error;

/// One-shot completion signal handed to a single animation.
///
/// Consuming it in [`Completion::finish`] signals the owning watchdog once.
/// Dropping it unfinished leaves the phase waiting forever.
pub struct Completion {
    signal: Option<Box<dyn FnOnce() + Send>>,
}

impl Completion {
    pub(crate) fn new(signal: impl FnOnce() + Send + 'static) -> Self {
        Self {
            signal: Some(Box::new(signal)),
        }
    }

    /// Report this animation as finished
    pub fn finish(mut self) {
        if let Some(signal) = self.signal.take() {
            signal();
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.signal.is_some() {
            tracing::warn!("animation completion dropped unfinished; its phase will not complete");
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.signal.is_some())
            .finish()
    }
}

/// An animation owned by the host's tweening machinery
pub trait Animation: Send {
    /// Start the animation; `done` must be finished exactly once when it ends
    fn start(self: Box<Self>, done: Completion);
}

impl<F> Animation for F
where
    F: FnOnce(Completion) + Send,
{
    fn start(self: Box<Self>, done: Completion) {
        (*self)(done)
    }
}

/// The renderer side of a transition
pub trait AnimationHost: Send + Sync + 'static {
    type Graph: Clone + Send + Sync + 'static;

    /// Removal animations for elements of `current` that are absent from `next`
    fn plan_removals(
        &self,
        current: Option<&Self::Graph>,
        next: &Self::Graph,
    ) -> Vec<Box<dyn Animation>>;

    /// Add/draw animations for the elements of `next`
    fn plan_additions(&self, next: &Self::Graph) -> Vec<Box<dyn Animation>>;

    /// Called once `shown` is fully drawn
    fn transition_finished(&self, _shown: &Self::Graph) {}
}

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("graph changes are blocked while animations are running")]
    StillAnimating,
    #[error(transparent)]
    Join(#[from] JoinError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// Snapshot of a sequencer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencerStatus {
    pub phase: CyclePhase,
    pub completed: u64,
    pub phase1: JoinStatus,
    pub phase2: JoinStatus,
}

type FinishListener<G> = Arc<dyn Fn(&G) + Send + Sync>;

struct SequencerState<G> {
    current: Option<G>,
    cycle: TransitionCycle,
}

/// Coordinator owning both watchdogs of a graph transition
pub struct Sequencer<H: AnimationHost, K: Clock = SystemClock> {
    host: H,
    me: Weak<Self>,
    phase1: Phase1Watchdog<Self, K>,
    phase2: Phase2Watchdog<Self, K>,
    state: Mutex<SequencerState<H::Graph>>,
    listeners: Mutex<Vec<FinishListener<H::Graph>>>,
}

impl<H: AnimationHost> Sequencer<H> {
    pub fn new(host: H) -> Arc<Self> {
        Self::with_clock(host, SystemClock, JoinConfig::default())
    }
}

impl<H: AnimationHost, K: Clock> Sequencer<H, K> {
    pub fn with_clock(host: H, clock: K, config: JoinConfig) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| Self {
            host,
            me: me.clone(),
            phase1: Phase1Watchdog::with_clock(me.clone(), clock.clone())
                .with_config(config.clone()),
            phase2: Phase2Watchdog::with_clock(me.clone(), clock).with_config(config),
            state: Mutex::new(SequencerState {
                current: None,
                cycle: TransitionCycle::new(),
            }),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn state(&self) -> MutexGuard<'_, SequencerState<H::Graph>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The graph shown, or being drawn, after the last phase 1
    pub fn current(&self) -> Option<H::Graph> {
        self.state().current.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.state().cycle.is_animating()
    }

    pub fn status(&self) -> SequencerStatus {
        let (phase, completed) = {
            let state = self.state();
            (state.cycle.phase(), state.cycle.completed())
        };
        SequencerStatus {
            phase,
            completed,
            phase1: self.phase1.status(),
            phase2: self.phase2.status(),
        }
    }

    /// Stall reports for both phases; each is logged at warn level
    pub fn check_stalls(&self) -> Vec<StallReport> {
        let reports: Vec<StallReport> = [self.phase1.stall(), self.phase2.stall()]
            .into_iter()
            .flatten()
            .collect();
        for report in &reports {
            tracing::warn!(
                name = %report.name,
                generation = report.generation,
                remaining = report.remaining,
                waited = ?report.waited,
                "transition stalled"
            );
        }
        reports
    }

    /// Start the transition to `next`.
    ///
    /// Refused with [`SequencerError::StillAnimating`] while a previous
    /// transition is running.
    pub fn transition_to(&self, next: H::Graph) -> Result<(), SequencerError> {
        self.transition_with(|| Some(next)).map(|_| ())
    }

    /// Start a transition to the graph chosen by `pick`.
    ///
    /// `pick` runs under the sequencer lock once the sequencer is known to be
    /// idle, so concurrent callers never both start a transition. It must not
    /// call back into the sequencer. Returns `Ok(false)` without starting
    /// anything when `pick` yields `None`.
    pub fn transition_with(
        &self,
        pick: impl FnOnce() -> Option<H::Graph>,
    ) -> Result<bool, SequencerError> {
        let (current, next) = {
            let mut state = self.state();
            if state.cycle.is_animating() {
                tracing::info!(phase = %state.cycle.phase(), "graph change blocked while animating");
                return Err(SequencerError::StillAnimating);
            }
            let Some(next) = pick() else {
                return Ok(false);
            };
            state.cycle.apply(CycleInput::Begin)?;
            (state.current.clone(), next)
        };

        let removals = self.host.plan_removals(current.as_ref(), &next);
        tracing::info!(removals = removals.len(), "transition started");

        let armed = if removals.is_empty() {
            self.phase1.skip(next)
        } else {
            self.phase1.await_animations(removals.len(), next)
        };
        if let Err(e) = armed {
            // Nothing was started; the cycle never left phase 1
            self.state().cycle.abort();
            return Err(e.into());
        }

        for animation in removals {
            animation.start(self.completion(|s| s.phase1.finished().map(|_| ())));
        }
        Ok(true)
    }

    /// Register a listener called after every finished transition.
    ///
    /// Listeners run after the host is notified, with no lock held and the
    /// sequencer already idle, so a listener may start the next transition.
    pub fn on_finished(&self, listener: impl Fn(&H::Graph) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(listener));
    }

    fn completion(
        &self,
        signal: impl FnOnce(&Self) -> Result<(), JoinError> + Send + 'static,
    ) -> Completion {
        let me = self.me.clone();
        Completion::new(move || {
            let Some(sequencer) = me.upgrade() else {
                tracing::debug!("animation finished after its sequencer was dropped");
                return;
            };
            if let Err(e) = signal(&sequencer) {
                tracing::error!(error = %e, "animation completion rejected");
            }
        })
    }
}

impl<H: AnimationHost, K: Clock> TransitionCoordinator for Sequencer<H, K> {
    type Graph = H::Graph;

    fn begin_phase2(&self, next: H::Graph) {
        {
            let mut state = self.state();
            if let Err(e) = state.cycle.apply(CycleInput::DeletionsDone) {
                tracing::error!(error = %e, "phase 2 requested out of order");
                return;
            }
            state.current = Some(next.clone());
        }

        let additions = self.host.plan_additions(&next);
        tracing::debug!(additions = additions.len(), "phase 2 started");

        let armed = if additions.is_empty() {
            self.phase2.skip()
        } else {
            self.phase2.await_animations(additions.len())
        };
        if let Err(e) = armed {
            tracing::error!(error = %e, "failed to arm phase 2");
            return;
        }

        for animation in additions {
            animation.start(self.completion(|s| s.phase2.finished().map(|_| ())));
        }
    }

    fn on_all_animations_finished(&self) {
        let (revision, shown) = {
            let mut state = self.state();
            if let Err(e) = state.cycle.apply(CycleInput::AdditionsDone) {
                tracing::error!(error = %e, "transition finished out of order");
                return;
            }
            (state.cycle.completed(), state.current.clone())
        };

        tracing::info!(revision, "transition finished");
        let Some(shown) = shown else {
            return;
        };
        self.host.transition_finished(&shown);

        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for listener in listeners {
            listener(&shown);
        }
    }
}

impl<H: AnimationHost, K: Clock> std::fmt::Debug for Sequencer<H, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
