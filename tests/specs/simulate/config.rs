use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn config_prints_defaults() {
    evo()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[simulate]"))
        .stdout(predicate::str::contains("max_delay = \"40ms\""));
}

#[test]
fn config_file_values_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "evo.toml",
        "[watchdog]\nstall_threshold = \"5s\"\n\n[simulate]\nmax_delay = \"1ms\"\n",
    );

    evo()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("stall_threshold = \"5s\""))
        .stdout(predicate::str::contains("max_delay = \"1ms\""));
}

#[test]
fn simulate_uses_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "evo.toml",
        "[watchdog]\nstall_threshold = \"10s\"\n\n[simulate]\nmax_delay = \"2ms\"\n",
    );

    evo()
        .arg("--config")
        .arg(&path)
        .args(["simulate", "--removals", "2", "--additions", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "transition 1 finished: removed=2 added=2",
        ));
}
