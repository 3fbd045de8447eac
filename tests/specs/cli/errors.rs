use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn unknown_command_fails() {
    evo()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn mismatched_plan_is_rejected() {
    evo()
        .args(["simulate", "--removals", "1,2", "--additions", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--removals has 2 entries but --additions has 1",
        ));
}

#[test]
fn invalid_duration_flag_is_rejected() {
    evo()
        .args(["simulate", "--max-delay", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-delay"));
}

#[test]
fn missing_config_file_is_reported() {
    evo()
        .args(["--config", "does-not-exist.toml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}
