// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evo-core: phased animation synchronization for evolving graph views
//!
//! This crate provides:
//! - A generic counting join (arm with N, signal N times, continue once)
//! - Phase 1 / phase 2 animation watchdogs bound to a transition coordinator
//! - The transition cycle state machine
//! - A sequencer that drives a renderer through delete-then-add transitions
//! - Manual and auto-play navigation through a series of graph revisions

pub mod clock;
pub mod cycle;
pub mod evolution;
pub mod join;
pub mod sequencer;
pub mod watchdog;

pub use clock::{Clock, FakeClock, SystemClock};
pub use cycle::{CycleError, CycleInput, CyclePhase, TransitionCycle};
pub use evolution::{Direction, Evolution, NavigationError};
pub use join::{
    Continuation, CountingJoin, JoinConfig, JoinError, JoinProgress, JoinStatus, StallReport,
};
pub use sequencer::{
    Animation, AnimationHost, Completion, Sequencer, SequencerError, SequencerStatus,
};
pub use watchdog::{
    Addition, AnimationWatchDog, CoordinatorLink, Deletion, Phase, Phase1Watchdog,
    Phase2Watchdog, TransitionCoordinator,
};
