// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{Read, Seek, Write};
use std::thread;

use super::*;

fn device(capacity: usize) -> Arc<CommandDevice> {
    let settings = LogSettings { capacity, ..LogSettings::default() };
    Arc::new(CommandDevice::new(&settings).expect("valid settings"))
}

#[test]
fn write_then_read_to_end() -> anyhow::Result<()> {
    let dev = device(10);
    let mut writer = dev.open();
    writer.write_all(b"eins\nzwo\ndrei\n")?;

    let mut reader = dev.open();
    let mut out = String::new();
    reader.read_to_string(&mut out)?;
    assert_eq!(out, "eins\nzwo\ndrei\n");
    assert_eq!(reader.position(), 14);

    // At the end, further reads return 0.
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf)?, 0);
    Ok(())
}

#[test]
fn read_stops_at_record_boundary() -> anyhow::Result<()> {
    let dev = device(10);
    dev.open().write_all(b"zwo\ndrei\n")?;

    let mut reader = dev.open();
    let mut buf = [0u8; 64];
    assert_eq!(reader.read(&mut buf)?, 4);
    assert_eq!(&buf[..4], b"zwo\n");
    assert_eq!(reader.read(&mut buf)?, 5);
    assert_eq!(&buf[..5], b"drei\n");
    Ok(())
}

#[test]
fn writes_ignore_handle_position() -> anyhow::Result<()> {
    let dev = device(10);
    let mut handle = dev.open();
    handle.write_all(b"a\n")?;
    handle.seek(SeekFrom::Start(0))?;
    handle.write_all(b"b\n")?;
    assert_eq!(dev.snapshot()?, b"a\nb\n");
    assert_eq!(handle.position(), 0);
    Ok(())
}

#[test]
fn seek_variants() -> anyhow::Result<()> {
    let dev = device(10);
    let mut handle = dev.open();
    handle.write_all(b"zwo\ndrei\nvier\n")?;

    assert_eq!(handle.seek(SeekFrom::End(0))?, 14);
    assert_eq!(handle.seek(SeekFrom::End(-5))?, 9);
    assert_eq!(handle.seek(SeekFrom::Current(-2))?, 7);
    assert_eq!(handle.seek(SeekFrom::Start(4))?, 4);

    let mut buf = [0u8; 2];
    handle.read_exact(&mut buf)?;
    assert_eq!(&buf, b"dr");

    let err = handle.seek(SeekFrom::Current(-100)).err();
    assert_eq!(err.map(|e| e.kind()), Some(io::ErrorKind::InvalidInput));
    assert_eq!(handle.position(), 6);

    // Past the end is allowed and reads as EOF.
    assert_eq!(handle.seek(SeekFrom::Start(1_000))?, 1_000);
    assert_eq!(handle.read(&mut buf)?, 0);
    Ok(())
}

#[test]
fn seek_to_command_moves_position() -> anyhow::Result<()> {
    let dev = device(10);
    let mut handle = dev.open();
    for i in 1..=10 {
        handle.write_all(format!("write{i}\n").as_bytes())?;
    }

    assert_eq!(handle.seek_to_command(1, 0)?, 7);
    let mut buf = [0u8; 16];
    let n = handle.read(&mut buf)?;
    assert_eq!(&buf[..n], b"write2\n");

    assert_eq!(handle.seek_to_command(9, 5)?, 68);
    let n = handle.read(&mut buf)?;
    assert_eq!(&buf[..n], b"10\n");

    let before = handle.position();
    assert_eq!(handle.seek_to_command(10, 0), Err(LogError::OutOfRange));
    assert_eq!(handle.seek_to_command(0, 7), Err(LogError::OutOfRange));
    assert_eq!(handle.position(), before);
    Ok(())
}

#[test]
fn eviction_shifts_offsets_for_open_handles() -> anyhow::Result<()> {
    let dev = device(2);
    let mut handle = dev.open();
    handle.write_all(b"one\ntwo\n")?;
    handle.seek(SeekFrom::Start(4))?;
    handle.write_all(b"three\n")?;

    // Offset 4 now points at "three" instead of "two".
    let mut buf = [0u8; 16];
    let n = handle.read(&mut buf)?;
    assert_eq!(&buf[..n], b"three\n");
    assert_eq!(dev.snapshot()?, b"two\nthree\n");
    assert_eq!(dev.locate(4)?, (1, 0));
    assert_eq!(dev.locate(10), Err(LogError::NotFound));
    Ok(())
}

#[test]
fn handles_are_independent() -> anyhow::Result<()> {
    let dev = device(10);
    let mut a = dev.open();
    a.write_all(b"x\ny\n")?;
    let mut b = a.clone();
    let mut buf = [0u8; 2];
    a.read_exact(&mut buf)?;
    assert_eq!(a.position(), 2);
    assert_eq!(b.position(), 0);
    b.read_exact(&mut buf)?;
    assert_eq!(&buf, b"x\n");
    assert!(Arc::ptr_eq(a.device(), b.device()));
    Ok(())
}

#[test]
fn concurrent_writers_never_interleave_commands() -> anyhow::Result<()> {
    let dev = device(64);
    let writers: Vec<_> = (0..4)
        .map(|id| {
            let mut handle = dev.open();
            thread::spawn(move || -> io::Result<()> {
                for n in 0..10 {
                    // One write per command keeps each command in one locked
                    // append.
                    handle.write_all(format!("writer{id}-{n}\n").as_bytes())?;
                }
                Ok(())
            })
        })
        .collect();
    for w in writers {
        w.join().map_err(|_| anyhow::anyhow!("writer panicked"))??;
    }

    let snapshot = String::from_utf8(dev.snapshot()?)?;
    let mut lines: Vec<&str> = snapshot.lines().collect();
    assert_eq!(lines.len(), 40);
    lines.sort_unstable();
    lines.dedup();
    assert_eq!(lines.len(), 40);
    assert!(lines.iter().all(|l| l.starts_with("writer")));
    Ok(())
}

#[test]
fn lock_timeout_reports_busy() -> anyhow::Result<()> {
    let settings = LogSettings { lock_timeout_ms: Some(10), ..LogSettings::default() };
    let dev = Arc::new(CommandDevice::new(&settings)?);
    let mut handle = dev.open();

    let guard = dev.inner.lock();
    assert_eq!(handle.write_chunk(b"blocked\n"), Err(LogError::Busy));
    let err = handle.read(&mut [0u8; 4]).err();
    assert_eq!(err.map(|e| e.kind()), Some(io::ErrorKind::WouldBlock));
    drop(guard);

    assert_eq!(handle.write_chunk(b"free\n")?, 5);
    assert_eq!(dev.snapshot()?, b"free\n");
    Ok(())
}

#[test]
fn stats_through_device() -> anyhow::Result<()> {
    let dev = device(3);
    dev.append(b"a\nb\nc\nd\npart")?;
    let stats = dev.stats()?;
    assert_eq!(stats.commands, 3);
    assert_eq!(stats.total_bytes, 6);
    assert_eq!(stats.pending_bytes, 4);
    assert!(stats.full);
    assert_eq!(dev.total_bytes()?, 6);
    Ok(())
}

#[test]
fn zero_capacity_device_rejected() {
    let settings = LogSettings { capacity: 0, ..LogSettings::default() };
    assert_eq!(CommandDevice::new(&settings).err().map(|e| e.as_str()), Some("OUT_OF_RANGE"));
}
