// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulate command: drive graph transitions with timed fake animations

use crate::config::EvoConfig;
use anyhow::{anyhow, bail, Result};
use evo_core::{Animation, AnimationHost, Completion, Direction, Evolution, Sequencer, SystemClock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::interval;

#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Deletion animations per transition (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = [0usize, 3, 2])]
    removals: Vec<usize>,

    /// Add/draw animations per transition (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = [4usize, 2, 5])]
    additions: Vec<usize>,

    /// Upper bound for a single animation's duration (e.g. "40ms")
    #[arg(long, value_parser = humantime::parse_duration)]
    max_delay: Option<Duration>,

    /// Report transitions waiting longer than this (e.g. "5s")
    #[arg(long, value_parser = humantime::parse_duration)]
    stall_threshold: Option<Duration>,
}

impl SimulateArgs {
    fn plan(&self) -> Result<Vec<Revision>> {
        if self.removals.len() != self.additions.len() {
            bail!(
                "--removals has {} entries but --additions has {}; give one of each per transition",
                self.removals.len(),
                self.additions.len()
            );
        }
        Ok(self
            .removals
            .iter()
            .zip(&self.additions)
            .enumerate()
            .map(|(i, (&removals, &additions))| Revision {
                index: i + 1,
                removals,
                additions,
            })
            .collect())
    }
}

/// A simulated graph revision: how many elements leave and how many are drawn
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revision {
    pub index: usize,
    pub removals: usize,
    pub additions: usize,
}

/// Host whose animations finish on tokio timers
struct SimHost {
    runtime: Handle,
    max_delay: Duration,
    finished: mpsc::UnboundedSender<Revision>,
}

impl SimHost {
    /// Deterministic, staggered delay for animation `i` of `revision`
    fn delay(&self, revision: usize, i: usize) -> Duration {
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let seed = (i as u64)
            .wrapping_mul(37)
            .wrapping_add((revision as u64).wrapping_mul(11));
        match max_ms.checked_add(1) {
            Some(modulus) => Duration::from_millis(seed % modulus),
            None => Duration::from_millis(seed),
        }
    }

    fn animations(&self, revision: usize, count: usize) -> Vec<Box<dyn Animation>> {
        (0..count)
            .map(|i| {
                let runtime = self.runtime.clone();
                let delay = self.delay(revision, i);
                Box::new(move |done: Completion| {
                    runtime.spawn(async move {
                        tokio::time::sleep(delay).await;
                        done.finish();
                    });
                }) as Box<dyn Animation>
            })
            .collect()
    }
}

impl AnimationHost for SimHost {
    type Graph = Revision;

    fn plan_removals(&self, _current: Option<&Revision>, next: &Revision) -> Vec<Box<dyn Animation>> {
        self.animations(next.index, next.removals)
    }

    fn plan_additions(&self, next: &Revision) -> Vec<Box<dyn Animation>> {
        self.animations(next.index, next.additions)
    }

    fn transition_finished(&self, shown: &Revision) {
        if self.finished.send(shown.clone()).is_err() {
            tracing::debug!(revision = shown.index, "simulation no longer listening");
        }
    }
}

/// Tick period for stall checks; a zero threshold still checks at this rate
const MIN_STALL_CHECK: Duration = Duration::from_millis(10);

/// Auto-play every revision in order, returning them as they finish
pub async fn simulate(plan: Vec<Revision>, config: &EvoConfig) -> Result<Vec<Revision>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let host = SimHost {
        runtime: Handle::current(),
        max_delay: config.simulate.max_delay,
        finished: tx,
    };
    let expected = plan.len();
    let sequencer = Sequencer::with_clock(host, SystemClock, config.watchdog.clone());
    let evolution = Evolution::new(sequencer, plan);

    let mut stall_check = interval(
        config
            .watchdog
            .stall_threshold
            .unwrap_or(Duration::from_secs(60))
            .max(MIN_STALL_CHECK),
    );
    let mut finished = Vec::with_capacity(expected);
    if expected == 0 {
        return Ok(finished);
    }

    evolution.set_autoplay(Some(Direction::Forward))?;
    while finished.len() < expected {
        tokio::select! {
            shown = rx.recv() => {
                let shown = shown.ok_or_else(|| anyhow!("animation host went away"))?;
                tracing::debug!(revision = shown.index, "transition finished");
                finished.push(shown);
            }
            _ = stall_check.tick() => {
                evolution.sequencer().check_stalls();
            }
        }
    }
    Ok(finished)
}

pub async fn handle(args: SimulateArgs, config: EvoConfig) -> Result<()> {
    let config = config
        .with_max_delay(args.max_delay)
        .with_stall_threshold(args.stall_threshold);
    let plan = args.plan()?;

    for revision in simulate(plan, &config).await? {
        println!(
            "transition {} finished: removed={} added={}",
            revision.index, revision.removals, revision.additions
        );
    }
    println!("done");
    Ok(())
}

#[cfg(test)]
#[path = "simulate_tests.rs"]
mod tests;
