// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: builders and assertion helpers.

use std::sync::Arc;

use crate::config::LogSettings;
use crate::device::{CommandDevice, DeviceHandle};
use crate::error::LogError;

/// Builder for constructing a `CommandDevice` in tests with sensible defaults.
pub struct DeviceBuilder {
    settings: LogSettings,
    commands: Vec<Vec<u8>>,
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceBuilder {
    pub fn new() -> Self {
        Self { settings: LogSettings::default(), commands: vec![] }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.settings.capacity = capacity;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.settings.delimiter = delimiter;
        self
    }

    pub fn staging(mut self, initial: usize, max: Option<usize>) -> Self {
        self.settings.initial_staging = initial;
        self.settings.max_staging = max;
        self
    }

    pub fn lock_timeout_ms(mut self, ms: u64) -> Self {
        self.settings.lock_timeout_ms = Some(ms);
        self
    }

    /// Commands written (with a trailing delimiter) before the device is
    /// returned.
    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.commands.extend(commands.into_iter().map(|c| c.as_ref().to_vec()));
        self
    }

    /// Build the device and a handle positioned at offset 0.
    pub fn build(self) -> Result<(Arc<CommandDevice>, DeviceHandle), LogError> {
        let device = Arc::new(CommandDevice::new(&self.settings)?);
        let mut handle = device.open();
        for mut command in self.commands {
            command.push(self.settings.delimiter);
            handle.write_chunk(&command)?;
        }
        Ok((device, handle))
    }
}

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = format!("{err:#}");
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
