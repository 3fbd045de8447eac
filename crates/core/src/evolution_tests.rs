// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sequencer::{Animation, Completion};
use yare::parameterized;

#[derive(Clone, Debug, PartialEq)]
struct TestGraph {
    name: &'static str,
    nodes: Vec<&'static str>,
}

fn graph(name: &'static str, nodes: &[&'static str]) -> TestGraph {
    TestGraph {
        name,
        nodes: nodes.to_vec(),
    }
}

/// v2 is empty, so its additions are skipped and finish synchronously
fn series() -> Vec<TestGraph> {
    vec![graph("v1", &["a"]), graph("v2", &[]), graph("v3", &["b"])]
}

#[derive(Clone, Default)]
struct FakeHost {
    immediate: bool,
    log: Arc<Mutex<Vec<String>>>,
    pending: Arc<Mutex<Vec<Completion>>>,
}

impl FakeHost {
    fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn finish_pending(&self) {
        let pending: Vec<Completion> = std::mem::take(&mut *self.pending.lock().unwrap());
        for done in pending {
            done.finish();
        }
    }

    fn animation(&self, label: String) -> Box<dyn Animation> {
        let host = self.clone();
        Box::new(move |done: Completion| {
            host.log.lock().unwrap().push(label);
            if host.immediate {
                done.finish();
            } else {
                host.pending.lock().unwrap().push(done);
            }
        })
    }
}

impl AnimationHost for FakeHost {
    type Graph = TestGraph;

    fn plan_removals(
        &self,
        current: Option<&TestGraph>,
        next: &TestGraph,
    ) -> Vec<Box<dyn Animation>> {
        let Some(current) = current else {
            return Vec::new();
        };
        current
            .nodes
            .iter()
            .filter(|node| !next.nodes.contains(*node))
            .map(|node| self.animation(format!("remove:{node}")))
            .collect()
    }

    fn plan_additions(&self, next: &TestGraph) -> Vec<Box<dyn Animation>> {
        next.nodes
            .iter()
            .map(|node| self.animation(format!("add:{node}")))
            .collect()
    }

    fn transition_finished(&self, shown: &TestGraph) {
        self.log.lock().unwrap().push(format!("finished:{}", shown.name));
    }
}

fn evolution(host: &FakeHost) -> Arc<Evolution<FakeHost>> {
    Evolution::new(Sequencer::new(host.clone()), series())
}

const FORWARD_LOG: [&str; 6] = [
    "add:a",
    "finished:v1",
    "remove:a",
    "finished:v2",
    "add:b",
    "finished:v3",
];

#[parameterized(
    from_start = { None, Some(0) },
    from_middle = { Some(1), Some(2) },
    at_end = { Some(2), None },
)]
fn direction_steps_within_bounds(index: Option<usize>, expected: Option<usize>) {
    assert_eq!(Direction::Forward.step(index, 3), expected);
}

#[test]
fn reverse_never_steps_before_first() {
    assert_eq!(Direction::Reverse.step(None, 3), None);
    assert_eq!(Direction::Reverse.step(Some(0), 3), None);
    assert_eq!(Direction::Reverse.step(Some(2), 3), Some(1));
}

#[test]
fn autoplay_runs_synchronous_series_to_the_end() {
    let host = FakeHost::immediate();
    let evolution = evolution(&host);

    evolution.set_autoplay(Some(Direction::Forward)).unwrap();

    assert_eq!(host.log(), FORWARD_LOG);
    assert_eq!(evolution.current_index(), Some(2));
    assert_eq!(evolution.autoplay(), None);
    assert_eq!(evolution.sequencer().status().completed, 3);
    assert!(!evolution.sequencer().is_animating());
}

#[test]
fn autoplay_chains_each_transition_from_the_finish_callback() {
    let host = FakeHost::default();
    let evolution = evolution(&host);

    evolution.set_autoplay(Some(Direction::Forward)).unwrap();
    assert_eq!(host.log(), ["add:a"]);
    assert_eq!(evolution.current_index(), Some(0));

    // Removing `a` finishes v2 with no additions, which starts v3 right away
    host.finish_pending();
    assert_eq!(host.log(), FORWARD_LOG[..3]);
    assert_eq!(evolution.current_index(), Some(1));

    host.finish_pending();
    assert_eq!(host.log(), FORWARD_LOG[..5]);
    assert_eq!(evolution.current_index(), Some(2));
    assert_eq!(evolution.autoplay(), Some(Direction::Forward));

    host.finish_pending();
    assert_eq!(host.log(), FORWARD_LOG);
    assert_eq!(evolution.autoplay(), None);
    assert!(!evolution.sequencer().is_animating());
}

#[test]
fn reverse_autoplay_stops_at_first_graph() {
    let host = FakeHost::immediate();
    let evolution = evolution(&host);
    evolution.show_index(2).unwrap();
    host.log.lock().unwrap().clear();

    evolution.set_autoplay(Some(Direction::Reverse)).unwrap();

    assert_eq!(
        host.log(),
        ["remove:b", "finished:v2", "add:a", "finished:v1"]
    );
    assert_eq!(evolution.current_index(), Some(0));
    assert_eq!(evolution.autoplay(), None);
}

#[test]
fn enabling_autoplay_at_the_end_switches_it_back_off() {
    let host = FakeHost::immediate();
    let evolution = evolution(&host);
    evolution.show_index(2).unwrap();

    evolution.set_autoplay(Some(Direction::Forward)).unwrap();

    assert_eq!(evolution.autoplay(), None);
    assert_eq!(evolution.current_index(), Some(2));
}

#[test]
fn enabling_autoplay_mid_transition_continues_after_it() {
    let host = FakeHost::default();
    let evolution = evolution(&host);
    assert_eq!(evolution.show_next().unwrap(), 0);

    evolution.set_autoplay(Some(Direction::Forward)).unwrap();
    assert_eq!(evolution.current_index(), Some(0));
    assert_eq!(evolution.autoplay(), Some(Direction::Forward));

    host.finish_pending();
    assert_eq!(evolution.current_index(), Some(1));
}

#[test]
fn manual_moves_refused_during_autoplay() {
    let host = FakeHost::default();
    let evolution = evolution(&host);
    evolution.set_autoplay(Some(Direction::Forward)).unwrap();

    assert!(matches!(
        evolution.show_next(),
        Err(NavigationError::AutoPlaying(Direction::Forward))
    ));
    assert!(matches!(
        evolution.show_previous(),
        Err(NavigationError::AutoPlaying(Direction::Forward))
    ));
    assert!(matches!(
        evolution.show_index(2),
        Err(NavigationError::AutoPlaying(Direction::Forward))
    ));

    evolution.set_autoplay(None).unwrap();
    host.finish_pending();
    assert_eq!(evolution.current_index(), Some(0));
    assert!(!evolution.sequencer().is_animating());
}

#[test]
fn manual_moves_refused_while_animating() {
    let host = FakeHost::default();
    let evolution = evolution(&host);
    evolution.show_next().unwrap();

    assert!(matches!(
        evolution.show_next(),
        Err(NavigationError::Sequencer(SequencerError::StillAnimating))
    ));
    assert_eq!(evolution.current_index(), Some(0));

    host.finish_pending();
    assert_eq!(evolution.show_next().unwrap(), 1);
}

#[test]
fn manual_moves_stop_at_either_end() {
    let host = FakeHost::immediate();
    let evolution = evolution(&host);

    assert!(matches!(
        evolution.show_previous(),
        Err(NavigationError::AtFirst)
    ));
    assert_eq!(evolution.show_next().unwrap(), 0);
    assert!(matches!(
        evolution.show_previous(),
        Err(NavigationError::AtFirst)
    ));
    assert_eq!(evolution.show_next().unwrap(), 1);
    assert_eq!(evolution.show_next().unwrap(), 2);
    assert!(matches!(evolution.show_next(), Err(NavigationError::AtLast)));
    assert_eq!(evolution.show_previous().unwrap(), 1);
}

#[test]
fn show_index_rejects_out_of_range() {
    let host = FakeHost::immediate();
    let evolution = evolution(&host);

    let err = evolution.show_index(3).unwrap_err();

    assert!(matches!(
        err,
        NavigationError::OutOfRange { index: 3, len: 3 }
    ));
    assert_eq!(err.to_string(), "no graph at index 3; the series has 3");
    assert_eq!(evolution.current_index(), None);
    assert!(host.log().is_empty());
}

#[test]
fn empty_series_has_nowhere_to_go() {
    let host = FakeHost::immediate();
    let evolution = Evolution::new(Sequencer::new(host.clone()), Vec::new());

    assert!(evolution.is_empty());
    assert!(matches!(evolution.show_next(), Err(NavigationError::AtLast)));
    evolution.set_autoplay(Some(Direction::Forward)).unwrap();
    assert_eq!(evolution.autoplay(), None);
}

#[test]
fn dropped_evolution_stops_chaining() {
    let host = FakeHost::default();
    let evolution = evolution(&host);
    let sequencer = Arc::clone(evolution.sequencer());
    evolution.set_autoplay(Some(Direction::Forward)).unwrap();

    drop(evolution);
    host.finish_pending();

    assert_eq!(host.log(), ["add:a", "finished:v1"]);
    assert!(!sequencer.is_animating());
}
