// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

use crate::error::LogError;

/// One completed, delimiter-terminated command.
///
/// Records are immutable once built. Clones share the underlying storage,
/// which is released when the last clone is dropped.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Record {
    data: Bytes,
}

impl Record {
    /// Copy `span` into freshly allocated storage owned by the new record.
    ///
    /// Returns `AllocationFailure` if the storage cannot be reserved, and
    /// `OutOfRange` for an empty span (records always have `size > 0`).
    pub fn try_copy_from(span: &[u8]) -> Result<Self, LogError> {
        if span.is_empty() {
            return Err(LogError::OutOfRange);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(span.len())
            .map_err(|_| LogError::AllocationFailure)?;
        buf.extend_from_slice(span);
        Ok(Self { data: Bytes::from(buf) })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Zero-copy view of `self[start..end]`.
    pub fn slice(&self, start: usize, end: usize) -> Bytes {
        self.data.slice(start..end)
    }

    /// Record contents without its trailing delimiter, if present.
    pub fn trimmed(&self, delimiter: u8) -> &[u8] {
        match self.data.split_last() {
            Some((&last, rest)) if last == delimiter => rest,
            _ => &self.data,
        }
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl Deref for Record {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Record").field(&String::from_utf8_lossy(&self.data)).finish()
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
