// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::ring::DEFAULT_CAPACITY;

/// Default delimiter terminating a command.
pub const DEFAULT_DELIMITER: u8 = b'\n';

/// Initial staging buffer size, in bytes.
pub const DEFAULT_STAGING_SIZE: usize = 100;

/// Construction-time settings for a command log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Maximum number of records held before the oldest is evicted.
    pub capacity: usize,
    pub delimiter: u8,
    /// Staging capacity allocated on first append.
    pub initial_staging: usize,
    /// Upper bound on staging growth. `None` leaves growth to the allocator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_staging: Option<usize>,
    /// Device lock acquisition timeout. `None` blocks indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            delimiter: DEFAULT_DELIMITER,
            initial_staging: DEFAULT_STAGING_SIZE,
            max_staging: None,
            lock_timeout_ms: None,
        }
    }
}

impl LogSettings {
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.capacity)
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}

/// Fixed-capacity command log fed from files or stdin.
#[derive(Debug, Parser)]
#[command(name = "cmdlog", version, about)]
pub struct Config {
    /// Maximum number of commands kept in the log.
    #[arg(long, env = "CMDLOG_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Command delimiter: a single character, an escape (\n, \r, \t, \0)
    /// or a hex byte (0x0a).
    #[arg(long, env = "CMDLOG_DELIMITER", default_value = "\\n")]
    pub delimiter: String,

    /// Initial staging buffer size in bytes.
    #[arg(long, env = "CMDLOG_STAGING_SIZE", default_value_t = DEFAULT_STAGING_SIZE)]
    pub staging_size: usize,

    /// Maximum staging buffer size in bytes.
    #[arg(long, env = "CMDLOG_MAX_STAGING")]
    pub max_staging: Option<usize>,

    /// Start output at this command index (0 = oldest held command).
    #[arg(long)]
    pub command: Option<usize>,

    /// Byte offset within the command selected by --command.
    #[arg(long, requires = "command")]
    pub command_offset: Option<usize>,

    /// Print log statistics as JSON instead of the log contents.
    #[arg(long)]
    pub stats: bool,

    /// Log format (json or text).
    #[arg(long, env = "CMDLOG_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "CMDLOG_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Files to ingest in order. Reads stdin when empty.
    pub inputs: Vec<PathBuf>,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.capacity == 0 {
            anyhow::bail!("--capacity must be at least 1");
        }
        if self.staging_size == 0 {
            anyhow::bail!("--staging-size must be at least 1");
        }
        if let Some(max) = self.max_staging {
            if max < self.staging_size {
                anyhow::bail!("--max-staging ({max}) is smaller than --staging-size ({})", self.staging_size);
            }
        }
        if !matches!(self.log_format.as_str(), "json" | "text") {
            anyhow::bail!("invalid log format: {}", self.log_format);
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// Parse the delimiter argument into a single byte.
    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        parse_delimiter(&self.delimiter)
    }

    /// Settings for the device built from this configuration.
    pub fn log_settings(&self) -> anyhow::Result<LogSettings> {
        Ok(LogSettings {
            capacity: self.capacity,
            delimiter: self.delimiter_byte()?,
            initial_staging: self.staging_size,
            max_staging: self.max_staging,
            lock_timeout_ms: None,
        })
    }

    /// Build a minimal `Config` for tests (stdin input, text logs).
    #[doc(hidden)]
    pub fn test() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            delimiter: "\\n".into(),
            staging_size: 16,
            max_staging: None,
            command: None,
            command_offset: None,
            stats: false,
            log_format: "text".into(),
            log_level: "debug".into(),
            inputs: vec![],
        }
    }
}

/// Parse a delimiter spelled as a character, an escape or a hex byte.
pub fn parse_delimiter(s: &str) -> anyhow::Result<u8> {
    match s {
        "\\n" => return Ok(b'\n'),
        "\\r" => return Ok(b'\r'),
        "\\t" => return Ok(b'\t'),
        "\\0" => return Ok(0),
        _ => {}
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16)
            .map_err(|e| anyhow::anyhow!("invalid hex delimiter {s:?}: {e}"));
    }
    match s.as_bytes() {
        [byte] => Ok(*byte),
        _ => anyhow::bail!("delimiter must be a single byte, got {s:?}"),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
