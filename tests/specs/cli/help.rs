use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    evo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn simulate_help_describes_flags() {
    evo()
        .args(["simulate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--removals"))
        .stdout(predicate::str::contains("--additions"))
        .stdout(predicate::str::contains("--stall-threshold"));
}
