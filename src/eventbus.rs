//! Listener fan-out for classified presses.
//!
//! The detector's output stays a pure event stream; anything that *acts* on a
//! press (flashlight toggles, remaps, logging) subscribes here instead of
//! being wired into the classification path. A [`PressBus`] holds any number
//! of [`PressListener`]s with per-listener filters and enable flags and
//! replays presses to the ones that match.

use crate::detector::DetectorHandle;
use crate::event::{ButtonChannel, ClassifiedPress, PressKind};
use std::collections::HashMap;

/// Trait for reacting to classified presses.
pub trait PressListener: Send {
    fn on_press(&mut self, press: &ClassifiedPress);
}

/// Determines which presses a listener wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressFilter {
    All,
    ShortOnly,
    LongOnly,
    /// Only presses from one channel.
    Channel(ButtonChannel),
    Custom(fn(&ClassifiedPress) -> bool),
}

/// Metadata-wrapped listener with filter and control flag.
struct ListenerEntry {
    listener: Box<dyn PressListener>,
    enabled: bool,
    filter: PressFilter,
}

/// Fan-out bus for [`ClassifiedPress`] values.
#[derive(Default)]
pub struct PressBus {
    next_id: u64,
    listeners: HashMap<u64, ListenerEntry>,
}

impl PressBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener; returns an id usable with
    /// [`enable`](Self::enable)/[`disable`](Self::disable)/[`remove_listener`](Self::remove_listener).
    pub fn add_listener(&mut self, listener: impl PressListener + 'static, filter: PressFilter) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    /// Emits one press to all active and matching listeners.
    pub fn emit(&mut self, press: &ClassifiedPress) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }

            let passes_filter = match entry.filter {
                PressFilter::All => true,
                PressFilter::ShortOnly => matches!(press.kind, PressKind::Short),
                PressFilter::LongOnly => matches!(press.kind, PressKind::Long { .. }),
                PressFilter::Channel(channel) => press.channel == channel,
                PressFilter::Custom(f) => f(press),
            };

            if passes_filter {
                entry.listener.on_press(press);
            }
        }
    }

    /// Emits a batch of presses to matching listeners.
    pub fn emit_all(&mut self, presses: &[ClassifiedPress]) {
        for press in presses {
            self.emit(press);
        }
    }

    /// Drains every press currently queued on `handle` into the bus.
    ///
    /// Non-blocking; call this from whatever loop owns the handle.
    pub fn pump(&mut self, handle: &DetectorHandle) {
        while let Ok(press) = handle.events().try_recv() {
            self.emit(&press);
        }
    }
}
