// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Error kinds shared by the ring, the assembler and the device wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogError {
    /// Staging or record storage could not be grown. Only the in-progress
    /// append fails; previously completed records are untouched.
    AllocationFailure,
    /// Command index, intra-command offset or seek target outside the data
    /// currently held.
    OutOfRange,
    /// Byte offset at or past the logical end of the log.
    NotFound,
    /// The device lock could not be acquired within the configured timeout.
    Busy,
}

impl LogError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllocationFailure => "ALLOCATION_FAILURE",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::NotFound => "NOT_FOUND",
            Self::Busy => "BUSY",
        }
    }

    /// Whether the caller may simply reject the request and carry on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::AllocationFailure)
    }

    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::AllocationFailure => io::ErrorKind::OutOfMemory,
            Self::OutOfRange => io::ErrorKind::InvalidInput,
            Self::NotFound => io::ErrorKind::UnexpectedEof,
            Self::Busy => io::ErrorKind::WouldBlock,
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for LogError {}

impl From<LogError> for io::Error {
    fn from(err: LogError) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
