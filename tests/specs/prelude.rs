//! Shared helpers for CLI specs.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// The evo binary with logging quietened
pub fn evo() -> Command {
    let mut cmd = Command::cargo_bin("evo").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

/// Write `content` to `name` inside `dir`, returning the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
