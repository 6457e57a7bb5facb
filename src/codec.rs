//! Binary input-event record codec.
//!
//! This module is intentionally "dumb": it only turns bytes from a raw device
//! stream into [`RawEvent`] values. Higher-level policy (retry on empty reads,
//! classification, cancellation) lives in `detector.rs`.
//!
//! ## Wire format
//! One record is 24 bytes, little-endian, mirroring the kernel's
//! `struct input_event` on 64-bit `time_t` platforms:
//!
//! | offset | size | field        | type |
//! |-------:|-----:|--------------|------|
//! |      0 |    8 | seconds      | i64  |
//! |      8 |    8 | microseconds | i64  |
//! |     16 |    2 | type         | u16  |
//! |     18 |    2 | code         | u16  |
//! |     20 |    4 | value        | i32  |
//!
//! ## Accumulate-then-decode
//! [`read_event`] never decodes until exactly [`EVENT_SIZE`] bytes have
//! accumulated. A short read is absorbed into the loop; decoding a partial
//! buffer would desynchronize the stream permanently, with no way to recover
//! record boundaries.

use crate::event::{EventTime, RawEvent};
use std::io::{ErrorKind, Read};

/// Size in bytes of one raw input-event record.
pub const EVENT_SIZE: usize = 24;

#[inline]
fn le_i64(bytes: &[u8]) -> i64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(bytes);
    i64::from_le_bytes(b)
}

#[inline]
fn le_u16(bytes: &[u8]) -> u16 {
    let mut b = [0u8; 2];
    b.copy_from_slice(bytes);
    u16::from_le_bytes(b)
}

#[inline]
fn le_i32(bytes: &[u8]) -> i32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(bytes);
    i32::from_le_bytes(b)
}

/// Decode one complete 24-byte record.
pub fn decode_event(buf: &[u8; EVENT_SIZE]) -> RawEvent {
    RawEvent {
        time: EventTime {
            secs: le_i64(&buf[0..8]),
            usecs: le_i64(&buf[8..16]),
        },
        event_type: le_u16(&buf[16..18]),
        code: le_u16(&buf[18..20]),
        value: le_i32(&buf[20..24]),
    }
}

/// Encode a record into its 24-byte wire form.
///
/// Useful for synthetic device streams (virtual devices, scripted test input).
pub fn encode_event(event: &RawEvent) -> [u8; EVENT_SIZE] {
    let mut buf = [0u8; EVENT_SIZE];
    buf[0..8].copy_from_slice(&event.time.secs.to_le_bytes());
    buf[8..16].copy_from_slice(&event.time.usecs.to_le_bytes());
    buf[16..18].copy_from_slice(&event.event_type.to_le_bytes());
    buf[18..20].copy_from_slice(&event.code.to_le_bytes());
    buf[20..24].copy_from_slice(&event.value.to_le_bytes());
    buf
}

/// Read exactly one record from `reader`, or `None` on end-of-stream.
///
/// Accumulates exactly [`EVENT_SIZE`] bytes before decoding. If the reader
/// reports end-of-stream or fails mid-record, the partial bytes are discarded
/// and `None` is returned; this call never yields a record built from fewer
/// than 24 bytes. Retry/backoff policy belongs to the caller.
pub fn read_event<R: Read + ?Sized>(reader: &mut R) -> Option<RawEvent> {
    let mut buf = [0u8; EVENT_SIZE];
    let mut filled = 0;
    while filled < EVENT_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return None,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return None,
        }
    }
    Some(decode_event(&buf))
}
