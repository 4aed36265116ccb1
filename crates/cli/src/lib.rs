// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod assembler;
pub mod config;
pub mod device;
pub mod error;
pub mod record;
pub mod ring;
pub mod run;
pub mod test_support;

pub use assembler::{AppendOutcome, CommandAssembler, LogStats};
pub use config::LogSettings;
pub use device::{CommandDevice, DeviceHandle};
pub use error::LogError;
pub use record::Record;
pub use ring::RingLog;
