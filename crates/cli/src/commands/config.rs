// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config command: print the effective configuration

use crate::config::EvoConfig;
use anyhow::Result;

pub fn handle(config: &EvoConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
