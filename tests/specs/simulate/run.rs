use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn default_plan_runs_three_transitions() {
    evo()
        .args(["simulate", "--max-delay", "5ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "transition 1 finished: removed=0 added=4",
        ))
        .stdout(predicate::str::contains(
            "transition 2 finished: removed=3 added=2",
        ))
        .stdout(predicate::str::contains(
            "transition 3 finished: removed=2 added=5",
        ))
        .stdout(predicate::str::ends_with("done\n"));
}

#[test]
fn empty_transitions_complete() {
    evo()
        .args([
            "simulate",
            "--removals",
            "0,0",
            "--additions",
            "0,1",
            "--max-delay",
            "0ms",
        ])
        .assert()
        .success()
        .stdout(
            "transition 1 finished: removed=0 added=0\n\
             transition 2 finished: removed=0 added=1\n\
             done\n",
        );
}

#[test]
fn zero_stall_threshold_is_accepted() {
    evo()
        .args([
            "simulate",
            "--removals",
            "1",
            "--additions",
            "2",
            "--max-delay",
            "20ms",
            "--stall-threshold",
            "0s",
        ])
        .assert()
        .success()
        .stdout("transition 1 finished: removed=1 added=2\ndone\n");
}
