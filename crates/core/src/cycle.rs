// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition cycle state machine
//!
//! Tracks one graph transition across both watchdogs:
//! `Idle -> Phase1Waiting -> Phase2Waiting -> Idle`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a transition cycle currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    /// Waiting for deletion animations
    Phase1Waiting,
    /// Waiting for add/draw animations
    Phase2Waiting,
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CyclePhase::Idle => write!(f, "idle"),
            CyclePhase::Phase1Waiting => write!(f, "phase1-waiting"),
            CyclePhase::Phase2Waiting => write!(f, "phase2-waiting"),
        }
    }
}

/// Events that move a cycle forward
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleInput {
    /// A new transition was requested
    Begin,
    /// The phase-1 join released
    DeletionsDone,
    /// The phase-2 join released
    AdditionsDone,
    /// Arming failed; return to idle without counting a revision
    Abort,
}

impl std::fmt::Display for CycleInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleInput::Begin => write!(f, "begin"),
            CycleInput::DeletionsDone => write!(f, "deletions-done"),
            CycleInput::AdditionsDone => write!(f, "additions-done"),
            CycleInput::Abort => write!(f, "abort"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CycleError {
    #[error("transition already in progress ({0})")]
    Busy(CyclePhase),
    #[error("unexpected {input} while {phase}")]
    Unexpected { input: CycleInput, phase: CyclePhase },
}

/// Logical state of the current transition plus the number completed so far
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionCycle {
    phase: CyclePhase,
    completed: u64,
}

impl TransitionCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Number of transitions that reached the end of phase 2
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn is_animating(&self) -> bool {
        self.phase != CyclePhase::Idle
    }

    /// Return to idle from any phase without counting a revision
    pub fn abort(&mut self) {
        tracing::trace!(from = %self.phase, "cycle aborted");
        self.phase = CyclePhase::Idle;
    }

    /// Apply an input, returning the new phase
    pub fn apply(&mut self, input: CycleInput) -> Result<CyclePhase, CycleError> {
        let next = match (self.phase, input) {
            (CyclePhase::Idle, CycleInput::Begin) => CyclePhase::Phase1Waiting,
            (phase, CycleInput::Begin) => return Err(CycleError::Busy(phase)),
            (CyclePhase::Phase1Waiting, CycleInput::DeletionsDone) => CyclePhase::Phase2Waiting,
            (CyclePhase::Phase2Waiting, CycleInput::AdditionsDone) => {
                self.completed += 1;
                CyclePhase::Idle
            }
            (_, CycleInput::Abort) => {
                self.abort();
                return Ok(CyclePhase::Idle);
            }
            (phase, input) => return Err(CycleError::Unexpected { input, phase }),
        };
        tracing::trace!(from = %self.phase, to = %next, %input, "cycle transition");
        self.phase = next;
        Ok(next)
    }
}

#[cfg(test)]
#[path = "cycle_tests.rs"]
mod tests;
