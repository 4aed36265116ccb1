// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level CLI runner, shared by `main` and tests.

use std::fs::File;
use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::assembler::LogStats;
use crate::config::Config;
use crate::device::CommandDevice;

/// Ingest every input into a fresh device, then write either the log
/// contents or its statistics to `output`.
///
/// `stdin` is only read when `config.inputs` is empty.
pub fn run(config: &Config, stdin: impl Read, mut output: impl Write) -> anyhow::Result<LogStats> {
    let device = Arc::new(CommandDevice::new(&config.log_settings()?)?);

    ingest(config, &device, stdin)?;

    let stats = device.stats()?;
    if stats.pending_bytes > 0 {
        warn!(pending = stats.pending_bytes, "input ended without a delimiter, tail not logged");
    }
    info!(commands = stats.commands, total_bytes = stats.total_bytes, "ingest complete");

    if config.stats {
        serde_json::to_writer_pretty(&mut output, &stats)?;
        writeln!(output)?;
    } else {
        let mut reader = device.open();
        if let Some(command) = config.command {
            let offset = config.command_offset.unwrap_or(0);
            reader.seek_to_command(command, offset).with_context(|| {
                format!(
                    "command {command} offset {offset} is outside the {} held commands",
                    stats.commands
                )
            })?;
        }
        io::copy(&mut reader, &mut output)?;
    }
    output.flush()?;
    Ok(stats)
}

fn ingest(config: &Config, device: &Arc<CommandDevice>, mut stdin: impl Read) -> anyhow::Result<()> {
    let mut writer = device.open();
    if config.inputs.is_empty() {
        io::copy(&mut stdin, &mut writer).context("reading stdin")?;
        return Ok(());
    }
    for path in &config.inputs {
        let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let copied =
            io::copy(&mut file, &mut writer).with_context(|| format!("reading {}", path.display()))?;
        info!(path = %path.display(), bytes = copied, "ingested");
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
