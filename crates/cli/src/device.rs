// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock-serialized command log exposed through file-like handles.
//!
//! A [`CommandDevice`] owns one [`CommandAssembler`] behind a single mutex.
//! Every operation (append including eviction, read, seek) runs with that
//! mutex held for its full duration. Each [`DeviceHandle`] keeps its own
//! read position into the logical byte stream; writes always append.

use std::io::{self, SeekFrom};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::assembler::{AppendOutcome, CommandAssembler, LogStats};
use crate::config::LogSettings;
use crate::error::LogError;

/// Shared command log with single-lock serialization.
#[derive(Debug)]
pub struct CommandDevice {
    inner: Mutex<CommandAssembler>,
    lock_timeout: Option<Duration>,
}

// Compile-time assertion: handles are shared across threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<CommandDevice>();
};

impl CommandDevice {
    /// Build a device from settings. Fails with `OutOfRange` for a zero
    /// capacity.
    pub fn new(settings: &LogSettings) -> Result<Self, LogError> {
        Ok(Self {
            inner: Mutex::new(CommandAssembler::with_settings(settings)?),
            lock_timeout: settings.lock_timeout(),
        })
    }

    /// Open a new handle positioned at the start of the log.
    pub fn open(self: &Arc<Self>) -> DeviceHandle {
        debug!("open");
        DeviceHandle { device: Arc::clone(self), pos: 0 }
    }

    /// Acquire the device lock, giving up with `Busy` after the configured
    /// timeout.
    fn lock(&self) -> Result<MutexGuard<'_, CommandAssembler>, LogError> {
        match self.lock_timeout {
            Some(timeout) => self.inner.try_lock_for(timeout).ok_or(LogError::Busy),
            None => Ok(self.inner.lock()),
        }
    }

    /// Append a chunk. Evicted records are released before the lock is
    /// dropped.
    pub fn append(&self, chunk: &[u8]) -> Result<AppendOutcome, LogError> {
        let mut asm = self.lock()?;
        debug!(len = chunk.len(), pending = asm.pending_len(), "write");
        asm.append(chunk)
    }

    pub fn read_at(&self, offset: u64, max_len: usize) -> Result<Bytes, LogError> {
        let asm = self.lock()?;
        let Ok(offset) = usize::try_from(offset) else {
            return Ok(Bytes::new());
        };
        Ok(asm.read_at(offset, max_len))
    }

    pub fn seek_to_command(&self, command_index: usize, intra_offset: usize) -> Result<u64, LogError> {
        let asm = self.lock()?;
        let offset = asm.seek_to_command(command_index, intra_offset)?;
        Ok(offset as u64)
    }

    pub fn locate(&self, offset: u64) -> Result<(usize, usize), LogError> {
        let asm = self.lock()?;
        let offset = usize::try_from(offset).map_err(|_| LogError::NotFound)?;
        asm.locate(offset)
    }

    pub fn total_bytes(&self) -> Result<u64, LogError> {
        Ok(self.lock()?.total_bytes() as u64)
    }

    pub fn stats(&self) -> Result<LogStats, LogError> {
        Ok(self.lock()?.stats())
    }

    /// Concatenated contents of every held command, oldest first.
    pub fn snapshot(&self) -> Result<Vec<u8>, LogError> {
        let asm = self.lock()?;
        let mut out = Vec::with_capacity(asm.total_bytes());
        for (_, record) in asm.log().iter() {
            out.extend_from_slice(record);
        }
        Ok(out)
    }
}

/// Per-opener cursor into a [`CommandDevice`].
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    device: Arc<CommandDevice>,
    pos: u64,
}

impl DeviceHandle {
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn device(&self) -> &Arc<CommandDevice> {
        &self.device
    }

    /// Append `buf` to the log, independent of the current position.
    pub fn write_chunk(&mut self, buf: &[u8]) -> Result<usize, LogError> {
        self.device.append(buf)?;
        Ok(buf.len())
    }

    /// Read from the current position, stopping at the end of the command
    /// that contains it. Returns 0 at the end of the log.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, LogError> {
        debug!(len = buf.len(), pos = self.pos, "read");
        let data = self.device.read_at(self.pos, buf.len())?;
        buf[..data.len()].copy_from_slice(&data);
        self.pos += data.len() as u64;
        Ok(data.len())
    }

    /// Reposition the handle. `End` is relative to the bytes currently held.
    /// Positions past the end are allowed and read as end of log.
    pub fn seek_to(&mut self, target: SeekFrom) -> Result<u64, LogError> {
        let (base, delta) = match target {
            SeekFrom::Start(pos) => {
                self.pos = pos;
                return Ok(pos);
            }
            SeekFrom::Current(delta) => (self.pos, delta),
            SeekFrom::End(delta) => (self.device.total_bytes()?, delta),
        };
        let pos = base.checked_add_signed(delta).ok_or(LogError::OutOfRange)?;
        self.pos = pos;
        Ok(pos)
    }

    /// Position the handle at `intra_offset` within the `command_index`-th
    /// held command. The position is unchanged on error.
    pub fn seek_to_command(
        &mut self,
        command_index: usize,
        intra_offset: usize,
    ) -> Result<u64, LogError> {
        let pos = self.device.seek_to_command(command_index, intra_offset)?;
        debug!(command_index, intra_offset, pos, "seek to command");
        self.pos = pos;
        Ok(pos)
    }
}

impl io::Read for DeviceHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_chunk(buf)?)
    }
}

impl io::Write for DeviceHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_chunk(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for DeviceHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(self.seek_to(pos)?)
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
