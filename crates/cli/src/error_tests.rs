// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    allocation = { LogError::AllocationFailure, io::ErrorKind::OutOfMemory },
    out_of_range = { LogError::OutOfRange, io::ErrorKind::InvalidInput },
    not_found = { LogError::NotFound, io::ErrorKind::UnexpectedEof },
    busy = { LogError::Busy, io::ErrorKind::WouldBlock },
)]
fn to_io_error(err: LogError, expected: io::ErrorKind) {
    let io_err = io::Error::from(err);
    assert_eq!(io_err.kind(), expected);
    assert_eq!(io_err.to_string(), err.as_str());
}

#[test]
fn only_allocation_failure_is_fatal() {
    assert!(!LogError::AllocationFailure.is_recoverable());
    assert!(LogError::OutOfRange.is_recoverable());
    assert!(LogError::NotFound.is_recoverable());
    assert!(LogError::Busy.is_recoverable());
}

#[test]
fn serializes_as_variant_name() -> anyhow::Result<()> {
    assert_eq!(serde_json::to_string(&LogError::OutOfRange)?, "\"OutOfRange\"");
    Ok(())
}
