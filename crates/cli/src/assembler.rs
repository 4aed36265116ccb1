// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delimiter-driven assembly of streamed bytes into command records.
//!
//! Producers hand over chunks of any size; a command is complete once its
//! delimiter arrives, regardless of how the stream was split. Completed
//! commands are copied out of the staging buffer into their own storage and
//! stored in the [`RingLog`]. Readers address the held commands as one
//! concatenated byte stream, either by absolute offset or by
//! `(command index, offset within command)`.

use std::num::NonZeroUsize;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LogSettings;
use crate::error::LogError;
use crate::record::Record;
use crate::ring::RingLog;

/// Result of a successful [`CommandAssembler::append`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Records completed by this append, in stream order.
    pub completed: Vec<Record>,
    /// Records evicted from the log to make room, oldest first.
    pub evicted: Vec<Record>,
}

/// Point-in-time summary of an assembler and its log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    pub capacity: usize,
    pub commands: usize,
    pub total_bytes: usize,
    pub pending_bytes: usize,
    pub staging_capacity: usize,
    pub full: bool,
    pub write_index: usize,
    pub read_index: usize,
}

/// Accumulates raw chunks into delimiter-terminated records.
///
/// The staging buffer only ever holds the unterminated tail of the current
/// command. Its capacity grows by doubling (or to fit) and never shrinks.
#[derive(Debug)]
pub struct CommandAssembler {
    log: RingLog,
    staging: Vec<u8>,
    staging_capacity: usize,
    initial_staging: usize,
    max_staging: Option<usize>,
    delimiter: u8,
}

impl CommandAssembler {
    /// Create an assembler over an empty log of the given capacity, using
    /// the default delimiter and staging sizes.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::from_log(RingLog::new(capacity), &LogSettings::default())
    }

    /// Create an assembler from settings. Fails with `OutOfRange` for a zero
    /// capacity.
    pub fn with_settings(settings: &LogSettings) -> Result<Self, LogError> {
        let capacity = settings.capacity().ok_or(LogError::OutOfRange)?;
        Ok(Self::from_log(RingLog::new(capacity), settings))
    }

    fn from_log(log: RingLog, settings: &LogSettings) -> Self {
        Self {
            log,
            staging: Vec::new(),
            staging_capacity: 0,
            initial_staging: settings.initial_staging.max(1),
            max_staging: settings.max_staging,
            delimiter: settings.delimiter,
        }
    }

    /// Feed one chunk of the command stream.
    ///
    /// Every delimiter in `chunk` completes a record spanning from the start
    /// of the current command through the delimiter. On error nothing of
    /// `chunk` is consumed and the log is unchanged.
    pub fn append(&mut self, chunk: &[u8]) -> Result<AppendOutcome, LogError> {
        if chunk.is_empty() {
            return Ok(AppendOutcome::default());
        }

        let scan_from = self.staging.len();
        let needed = scan_from.checked_add(chunk.len()).ok_or(LogError::AllocationFailure)?;
        if let Err(err) = self.grow_to_fit(needed) {
            warn!(needed, capacity = self.staging_capacity, "staging buffer growth failed");
            return Err(err);
        }
        self.staging.extend_from_slice(chunk);

        let completed = match self.carve(scan_from) {
            Ok(completed) => completed,
            Err(err) => {
                warn!(pending = scan_from, "record allocation failed, dropping chunk");
                self.staging.truncate(scan_from);
                return Err(err);
            }
        };

        let consumed: usize = completed.iter().map(Record::size).sum();
        self.staging.drain(..consumed);

        let mut evicted = Vec::new();
        for record in &completed {
            debug!(size = record.size(), index = self.log.write_index(), "command completed");
            if let Some(old) = self.log.insert(record.clone()) {
                debug!(size = old.size(), "evicted oldest command");
                evicted.push(old);
            }
        }

        Ok(AppendOutcome { completed, evicted })
    }

    /// Copy every command terminated in `staging[scan_from..]` into its own
    /// record. Nothing is inserted until all allocations have succeeded.
    fn carve(&self, scan_from: usize) -> Result<Vec<Record>, LogError> {
        let mut records = Vec::new();
        let mut start = 0;
        let mut pos = scan_from;
        while let Some(found) = self.staging[pos..].iter().position(|&b| b == self.delimiter) {
            let end = pos + found + 1;
            records.push(Record::try_copy_from(&self.staging[start..end])?);
            start = end;
            pos = end;
        }
        Ok(records)
    }

    fn grow_to_fit(&mut self, needed: usize) -> Result<(), LogError> {
        if needed <= self.staging_capacity {
            return Ok(());
        }
        let target = if self.staging_capacity == 0 {
            self.initial_staging.max(needed)
        } else {
            self.staging_capacity.saturating_mul(2).max(needed)
        };
        let target = match self.max_staging {
            Some(max) if needed > max => return Err(LogError::AllocationFailure),
            Some(max) => target.min(max),
            None => target,
        };
        self.staging
            .try_reserve_exact(target - self.staging.len())
            .map_err(|_| LogError::AllocationFailure)?;
        debug!(from = self.staging_capacity, to = target, "staging buffer grown");
        self.staging_capacity = target;
        Ok(())
    }

    /// Up to `max_len` bytes starting at `offset`, never crossing into the
    /// next record. Empty at or past the end of the log.
    pub fn read_at(&self, offset: usize, max_len: usize) -> Bytes {
        match self.log.find_by_byte_offset(offset) {
            Some((record, intra)) => {
                let end = intra + max_len.min(record.size() - intra);
                record.slice(intra, end)
            }
            None => Bytes::new(),
        }
    }

    /// Absolute byte offset of `intra_offset` within the `command_index`-th
    /// held command.
    pub fn seek_to_command(
        &self,
        command_index: usize,
        intra_offset: usize,
    ) -> Result<usize, LogError> {
        let record = self.log.find_by_command_index(command_index).ok_or(LogError::OutOfRange)?;
        if intra_offset >= record.size() {
            return Err(LogError::OutOfRange);
        }
        let start = self.log.command_start(command_index).ok_or(LogError::OutOfRange)?;
        Ok(start + intra_offset)
    }

    /// Inverse of [`seek_to_command`](Self::seek_to_command): the command
    /// index and intra-command offset for an absolute byte offset.
    pub fn locate(&self, offset: usize) -> Result<(usize, usize), LogError> {
        let mut start = 0;
        for (index, record) in self.log.iter() {
            if offset < start + record.size() {
                return Ok((index, offset - start));
            }
            start += record.size();
        }
        Err(LogError::NotFound)
    }

    pub fn log(&self) -> &RingLog {
        &self.log
    }

    /// Bytes of the current, unterminated command.
    pub fn pending_len(&self) -> usize {
        self.staging.len()
    }

    pub fn pending(&self) -> &[u8] {
        &self.staging
    }

    pub fn staging_capacity(&self) -> usize {
        self.staging_capacity
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn total_bytes(&self) -> usize {
        self.log.total_bytes()
    }

    pub fn stats(&self) -> LogStats {
        LogStats {
            capacity: self.log.capacity(),
            commands: self.log.len(),
            total_bytes: self.log.total_bytes(),
            pending_bytes: self.staging.len(),
            staging_capacity: self.staging_capacity,
            full: self.log.is_full(),
            write_index: self.log.write_index(),
            read_index: self.log.read_index(),
        }
    }

    /// Tear down, handing back every held record oldest first. Pending
    /// unterminated bytes are discarded.
    pub fn into_records(mut self) -> Vec<Record> {
        if !self.staging.is_empty() {
            debug!(pending = self.staging.len(), "discarding unterminated command");
        }
        self.log.drain()
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
