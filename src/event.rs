//! Events and press classifications.
//!
//! PressUp deals with two event shapes:
//! - [`RawEvent`] — one decoded 24-byte kernel input-event record, exactly as
//!   read from the device node (wall-clock time, type, code, value).
//! - [`ClassifiedPress`] — the crate's public output: one short/long
//!   classification per completed press cycle, timestamped with a monotonic
//!   [`Instant`] suitable for ordering and delta timing within a run.
//!
//! ## Value conventions
//! - `value == 1` is a key-down edge, `value == 0` a key-up edge.
//! - `value == 2` (kernel auto-repeat while held) is deliberately ignored by
//!   the classifier: the long-press timer alone drives the long classification,
//!   so repeat chatter has no effect on timing.
//! - Key codes follow `linux/input-event-codes.h`; only the two volume codes
//!   are interpreted, everything else passes through unclassified.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Record type for key press/release/repeat records (`EV_KEY`).
pub const EV_KEY: u16 = 1;

/// Key code of the physical volume-down button (`KEY_VOLUMEDOWN`).
pub const KEY_VOLUMEDOWN: u16 = 114;

/// Key code of the physical volume-up button (`KEY_VOLUMEUP`).
pub const KEY_VOLUMEUP: u16 = 115;

/// `RawEvent::value` for a key-up edge.
pub const KEY_RELEASE: i32 = 0;

/// `RawEvent::value` for a key-down edge.
pub const KEY_PRESS: i32 = 1;

/// Kernel-reported wall-clock time of a raw record (`struct timeval` with
/// 64-bit fields).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventTime {
    /// Whole seconds since the epoch.
    pub secs: i64,
    /// Microseconds within the second.
    pub usecs: i64,
}

/// One decoded kernel input-event record.
///
/// Produced by [`codec::read_event`](crate::codec::read_event) for every
/// successfully accumulated 24-byte record; consumed once by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEvent {
    /// Kernel timestamp of the record.
    pub time: EventTime,
    /// Record type (`EV_KEY`, `EV_SYN`, ...).
    pub event_type: u16,
    /// Key code within the type (e.g. [`KEY_VOLUMEUP`]).
    pub code: u16,
    /// Transition value (0 = up, 1 = down, 2 = repeat).
    pub value: i32,
}

/// One of the two independently tracked volume buttons.
///
/// Each channel owns its own state machine in the classifier; operations on
/// one channel never touch the other's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonChannel {
    /// Volume-up button ([`KEY_VOLUMEUP`]).
    Up = 0,
    /// Volume-down button ([`KEY_VOLUMEDOWN`]).
    Down = 1,
}

impl ButtonChannel {
    /// Both channels, in stable index order.
    pub const ALL: [ButtonChannel; 2] = [ButtonChannel::Up, ButtonChannel::Down];

    /// Map a key code to its channel, or `None` for any unmonitored code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            KEY_VOLUMEUP => Some(ButtonChannel::Up),
            KEY_VOLUMEDOWN => Some(ButtonChannel::Down),
            _ => None,
        }
    }

    /// The key code this channel monitors.
    pub fn code(self) -> u16 {
        match self {
            ButtonChannel::Up => KEY_VOLUMEUP,
            ButtonChannel::Down => KEY_VOLUMEDOWN,
        }
    }
}

/// Short vs. long outcome of one press cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressKind {
    /// Released before the long-press threshold elapsed.
    Short,
    /// Held past the threshold.
    Long {
        /// How long the button had been held when the classification fired
        /// (always the configured threshold).
        held: Duration,
    },
}

/// One classified press, emitted exactly once per completed press cycle.
///
/// `at` is the monotonic capture time: for a short press the moment the
/// release was processed, for a long press the moment the threshold timer
/// fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifiedPress {
    /// Which button completed a cycle.
    pub channel: ButtonChannel,
    /// Short or long.
    pub kind: PressKind,
    /// Monotonic capture time.
    pub at: Instant,
}

impl ClassifiedPress {
    /// `true` for a long press.
    #[inline]
    pub fn is_long(&self) -> bool {
        matches!(self.kind, PressKind::Long { .. })
    }
}
