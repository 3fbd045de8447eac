// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Navigation through a series of graph revisions
//!
//! [`Evolution`] owns an ordered series of graphs and moves a [`Sequencer`]
//! through it one transition at a time, either manually or by auto-play.
//! Auto-play chains the next transition from the sequencer's finish
//! listener, so a series whose animations complete synchronously plays to
//! the end inside the call that enabled it.

use crate::clock::{Clock, SystemClock};
use crate::sequencer::{AnimationHost, Sequencer, SequencerError};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Direction of travel through the series
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Index one step from `index` in a series of `len`, if there is one.
    /// Nothing shown yet counts as standing just before the first graph.
    fn step(self, index: Option<usize>, len: usize) -> Option<usize> {
        let target = match (self, index) {
            (Direction::Forward, None) => 0,
            (Direction::Forward, Some(i)) => i.checked_add(1)?,
            (Direction::Reverse, None) => return None,
            (Direction::Reverse, Some(i)) => i.checked_sub(1)?,
        };
        (target < len).then_some(target)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("auto-play ({0}) is on; turn it off to move manually")]
    AutoPlaying(Direction),
    #[error("no graph at index {index}; the series has {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("already showing the last graph")]
    AtLast,
    #[error("already showing the first graph")]
    AtFirst,
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
}

impl NavigationError {
    fn at_end(direction: Direction) -> Self {
        match direction {
            Direction::Forward => NavigationError::AtLast,
            Direction::Reverse => NavigationError::AtFirst,
        }
    }
}

#[derive(Debug, Default)]
struct EvolutionState {
    index: Option<usize>,
    autoplay: Option<Direction>,
}

/// A graph series driven through a [`Sequencer`]
pub struct Evolution<H: AnimationHost, K: Clock = SystemClock> {
    sequencer: Arc<Sequencer<H, K>>,
    graphs: Vec<H::Graph>,
    state: Mutex<EvolutionState>,
}

impl<H: AnimationHost, K: Clock> Evolution<H, K> {
    /// Wrap `sequencer` with the series `graphs`; nothing is shown until the
    /// first move.
    pub fn new(sequencer: Arc<Sequencer<H, K>>, graphs: Vec<H::Graph>) -> Arc<Self> {
        let evolution = Arc::new(Self {
            sequencer,
            graphs,
            state: Mutex::new(EvolutionState::default()),
        });
        let me = Arc::downgrade(&evolution);
        evolution.sequencer.on_finished(move |_shown| {
            if let Some(evolution) = me.upgrade() {
                evolution.continue_autoplay();
            }
        });
        evolution
    }

    pub fn sequencer(&self) -> &Arc<Sequencer<H, K>> {
        &self.sequencer
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    fn state(&self) -> MutexGuard<'_, EvolutionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Index of the graph shown or being drawn
    pub fn current_index(&self) -> Option<usize> {
        self.state().index
    }

    pub fn autoplay(&self) -> Option<Direction> {
        self.state().autoplay
    }

    fn ensure_manual(&self) -> Result<(), NavigationError> {
        match self.autoplay() {
            Some(direction) => Err(NavigationError::AutoPlaying(direction)),
            None => Ok(()),
        }
    }

    /// Transition to the next graph; returns its index
    pub fn show_next(&self) -> Result<usize, NavigationError> {
        self.ensure_manual()?;
        self.step(Direction::Forward)
    }

    /// Transition to the previous graph; returns its index
    pub fn show_previous(&self) -> Result<usize, NavigationError> {
        self.ensure_manual()?;
        self.step(Direction::Reverse)
    }

    /// Transition straight to the graph at `index`
    pub fn show_index(&self, index: usize) -> Result<(), NavigationError> {
        self.ensure_manual()?;
        let len = self.graphs.len();
        let Some(graph) = self.graphs.get(index) else {
            return Err(NavigationError::OutOfRange { index, len });
        };
        self.move_to(|_| Some((index, graph.clone())))?;
        Ok(())
    }

    /// Turn auto-play on in `direction`, or off with `None`.
    ///
    /// Turning it on starts the next step right away unless a transition is
    /// still running, in which case that transition's end continues the
    /// chain. Auto-play switches itself off at either end of the series.
    pub fn set_autoplay(&self, direction: Option<Direction>) -> Result<(), NavigationError> {
        self.state().autoplay = direction;
        tracing::info!(autoplay = ?direction, "auto-play changed");
        let Some(direction) = direction else {
            return Ok(());
        };

        match self.step(direction) {
            Ok(_) | Err(NavigationError::Sequencer(SequencerError::StillAnimating)) => Ok(()),
            Err(NavigationError::AtLast | NavigationError::AtFirst) => {
                tracing::info!(%direction, "auto-play has nowhere to go");
                self.stop_autoplay(direction);
                Ok(())
            }
            Err(e) => {
                self.stop_autoplay(direction);
                Err(e)
            }
        }
    }

    fn continue_autoplay(&self) {
        let Some(direction) = self.autoplay() else {
            return;
        };
        match self.step(direction) {
            Ok(index) => tracing::debug!(index, %direction, "auto-play advanced"),
            Err(NavigationError::AtLast | NavigationError::AtFirst) => {
                tracing::info!(%direction, "auto-play reached the end of the series");
                self.stop_autoplay(direction);
            }
            Err(e) => {
                tracing::warn!(error = %e, %direction, "auto-play stopped");
                self.stop_autoplay(direction);
            }
        }
    }

    /// Switch auto-play off, unless it was changed in the meantime
    fn stop_autoplay(&self, direction: Direction) {
        let mut state = self.state();
        if state.autoplay == Some(direction) {
            state.autoplay = None;
        }
    }

    fn step(&self, direction: Direction) -> Result<usize, NavigationError> {
        let len = self.graphs.len();
        self.move_to(|index| {
            let target = direction.step(index, len)?;
            self.graphs.get(target).map(|graph| (target, graph.clone()))
        })?
        .ok_or(NavigationError::at_end(direction))
    }

    /// Start a transition to the target chosen from the current index.
    ///
    /// The index is updated before any animation starts, so a transition
    /// that finishes synchronously already sees its own position.
    fn move_to(
        &self,
        target: impl FnOnce(Option<usize>) -> Option<(usize, H::Graph)>,
    ) -> Result<Option<usize>, NavigationError> {
        let mut moved = None;
        let started = self.sequencer.transition_with(|| {
            let mut state = self.state();
            let (index, graph) = target(state.index)?;
            moved = Some((state.index, index));
            state.index = Some(index);
            Some(graph)
        });

        match (started, moved) {
            (Ok(true), Some((_, index))) => Ok(Some(index)),
            (Ok(_), _) => Ok(None),
            (Err(e), moved) => {
                if let Some((previous, index)) = moved {
                    let mut state = self.state();
                    if state.index == Some(index) {
                        state.index = previous;
                    }
                }
                Err(e.into())
            }
        }
    }
}

impl<H: AnimationHost, K: Clock> std::fmt::Debug for Evolution<H, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Evolution")
            .field("len", &self.graphs.len())
            .field("index", &state.index)
            .field("autoplay", &state.autoplay)
            .finish()
    }
}

#[cfg(test)]
#[path = "evolution_tests.rs"]
mod tests;
