// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::num::NonZeroUsize;

use crate::record::Record;

/// Reference capacity of a command log.
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity circular store of completed commands.
///
/// Slots fill from index 0 until the log wraps for the first time. From then
/// on every insertion evicts the oldest record, which is handed back to the
/// caller. The log has no locking of its own; callers serialize access.
///
/// The records, oldest first, form one logical byte stream that can be
/// addressed either by absolute byte offset or by command index.
#[derive(Debug)]
pub struct RingLog {
    slots: Vec<Option<Record>>,
    write_index: usize,
    read_index: usize,
    full: bool,
}

impl RingLog {
    /// Create an empty log holding at most `capacity` records.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: (0..capacity.get()).map(|_| None).collect(),
            write_index: 0,
            read_index: 0,
            full: false,
        }
    }

    /// Store `record` as the newest entry.
    ///
    /// Once the log is full the record previously in the target slot (the
    /// oldest one) is returned so the caller can dispose of it.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        let capacity = self.capacity();
        let was_full = self.full;
        let evicted = self.slots[self.write_index].replace(record);
        // Before the first wrap the target slot is always empty.
        debug_assert_eq!(evicted.is_some(), was_full);
        if was_full {
            self.read_index = (self.read_index + 1) % capacity;
        }
        self.write_index = (self.write_index + 1) % capacity;
        if self.write_index == 0 {
            self.full = true;
        }
        evicted
    }

    /// Occupied slots, oldest first, paired with their logical index.
    pub fn iter(&self) -> Iter<'_> {
        Iter { log: self, next: 0 }
    }

    /// Resolve an absolute byte offset into the record containing it and the
    /// offset within that record.
    pub fn find_by_byte_offset(&self, target: usize) -> Option<(&Record, usize)> {
        let mut start = 0usize;
        for (_, record) in self.iter() {
            let end = start + record.size();
            if target < end {
                return Some((record, target - start));
            }
            start = end;
        }
        None
    }

    /// The `index`-th record, oldest first.
    pub fn find_by_command_index(&self, index: usize) -> Option<&Record> {
        if index >= self.len() {
            return None;
        }
        self.slots[self.physical(index)].as_ref()
    }

    /// Absolute byte offset at which the `index`-th record starts.
    pub fn command_start(&self, index: usize) -> Option<usize> {
        if index >= self.len() {
            return None;
        }
        Some(self.iter().take(index).map(|(_, r)| r.size()).sum())
    }

    /// Total size of all records currently held.
    pub fn total_bytes(&self) -> usize {
        self.iter().map(|(_, r)| r.size()).sum()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            self.write_index
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.full && self.write_index == 0
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot that receives the next insertion.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Slot holding the oldest record once the log has wrapped.
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Remove every record, oldest first, and reset to the empty state.
    pub fn drain(&mut self) -> Vec<Record> {
        let len = self.len();
        let mut records = Vec::with_capacity(len);
        for logical in 0..len {
            let physical = self.physical(logical);
            if let Some(record) = self.slots[physical].take() {
                records.push(record);
            }
        }
        self.write_index = 0;
        self.read_index = 0;
        self.full = false;
        records
    }

    fn physical(&self, logical: usize) -> usize {
        (self.read_index + logical) % self.capacity()
    }
}

/// Oldest-to-newest traversal of a [`RingLog`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    log: &'a RingLog,
    next: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a Record);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        let record = self.log.find_by_command_index(index)?;
        self.next += 1;
        Some((index, record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.log.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a RingLog {
    type Item = (usize, &'a Record);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
#[path = "ring_tests.rs"]
mod tests;
