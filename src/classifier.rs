//! Press classification state machine.
//!
//! One [`Classifier`] tracks both volume channels independently. Per channel
//! the machine is:
//!
//! ```text
//! Idle --down--> Pending          (arm the long-press deadline)
//! Pending --up--> Idle            (emit Short)
//! Pending --deadline--> Triggered (emit Long)
//! Triggered --up--> Idle          (emit nothing, already classified)
//! ```
//!
//! A second down while already `Pending` re-arms the deadline instead of
//! corrupting state (bounced input); auto-repeat values are ignored, the
//! deadline alone drives the long classification. Exactly one
//! [`ClassifiedPress`] comes out of every physical press/release cycle.
//!
//! The machine is deliberately free of I/O and timers. Callers feed decoded
//! records through [`Classifier::handle`] and drive timeouts by polling
//! [`Classifier::next_deadline`] / [`Classifier::fire_due`]. `detector.rs`
//! funnels both onto a single worker queue, so key-up handling and deadline
//! fires can never interleave; it also makes every transition testable with
//! synthetic clocks.

use crate::event::{
    ButtonChannel, ClassifiedPress, PressKind, RawEvent, EV_KEY, KEY_PRESS, KEY_RELEASE,
};
use std::time::{Duration, Instant};

/// Per-channel machine state.
///
/// `pending` alone is the `Pending` state; `pending && triggered` is
/// `Triggered`; neither is `Idle`. At most one deadline is outstanding per
/// channel at any instant.
#[derive(Clone, Copy, Debug, Default)]
struct ChannelState {
    /// A press cycle is in flight (down seen, no up yet).
    pending: bool,
    /// The long-press deadline already fired for the in-flight cycle.
    triggered: bool,
    /// When the long classification is due, while pending and not triggered.
    deadline: Option<Instant>,
}

/// Two-channel short/long press classifier.
pub struct Classifier {
    threshold: Duration,
    channels: [ChannelState; 2],
}

impl Classifier {
    /// Classifier with the given long-press threshold, both channels idle.
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            channels: [ChannelState::default(); 2],
        }
    }

    /// The configured long-press threshold.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Feed one decoded record captured at `now`.
    ///
    /// Non-key records, unmonitored codes, and repeat values are discarded
    /// without effect. A short press is pushed onto `out` when a release beats
    /// the deadline.
    pub fn handle(&mut self, event: &RawEvent, now: Instant, out: &mut Vec<ClassifiedPress>) {
        if event.event_type != EV_KEY {
            return;
        }
        let Some(channel) = ButtonChannel::from_code(event.code) else {
            return;
        };
        match event.value {
            KEY_PRESS => self.on_down(channel, now),
            KEY_RELEASE => self.on_up(channel, now, out),
            // Auto-repeat (2) and exotic values: the deadline alone drives the
            // long classification, so nothing to do here.
            _ => {}
        }
    }

    fn on_down(&mut self, channel: ButtonChannel, now: Instant) {
        let deadline = now + self.threshold;
        let state = &mut self.channels[channel as usize];
        // A duplicate down without an intervening up re-arms the deadline.
        state.pending = true;
        state.triggered = false;
        state.deadline = Some(deadline);
    }

    fn on_up(&mut self, channel: ButtonChannel, now: Instant, out: &mut Vec<ClassifiedPress>) {
        let state = &mut self.channels[channel as usize];
        if state.pending && !state.triggered {
            out.push(ClassifiedPress {
                channel,
                kind: PressKind::Short,
                at: now,
            });
        }
        state.pending = false;
        state.triggered = false;
        state.deadline = None;
    }

    /// Earliest outstanding long-press deadline across both channels.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.channels.iter().filter_map(|state| state.deadline).min()
    }

    /// Fire every deadline at or before `now`, emitting one long press per
    /// due channel.
    pub fn fire_due(&mut self, now: Instant, out: &mut Vec<ClassifiedPress>) {
        let threshold = self.threshold;
        for channel in ButtonChannel::ALL {
            let state = &mut self.channels[channel as usize];
            let due = matches!(state.deadline, Some(deadline) if deadline <= now);
            if due && state.pending && !state.triggered {
                state.triggered = true;
                state.deadline = None;
                out.push(ClassifiedPress {
                    channel,
                    kind: PressKind::Long { held: threshold },
                    at: now,
                });
            }
        }
    }

    /// Drop every in-flight cycle on both channels.
    ///
    /// Nothing can be emitted afterwards until a new key-down arrives.
    pub fn reset(&mut self) {
        self.channels = [ChannelState::default(); 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, KEY_VOLUMEDOWN, KEY_VOLUMEUP};

    const T: Duration = Duration::from_millis(500);

    fn key(code: u16, value: i32) -> RawEvent {
        RawEvent {
            time: EventTime::default(),
            event_type: EV_KEY,
            code,
            value,
        }
    }

    /// Test clock: a fixed base plus millisecond offsets.
    struct Clock(Instant);

    impl Clock {
        fn new() -> Self {
            Clock(Instant::now())
        }
        fn at(&self, ms: u64) -> Instant {
            self.0 + Duration::from_millis(ms)
        }
    }

    #[test]
    fn release_before_threshold_is_short() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEUP, 1), clock.at(0), &mut out);
        assert!(out.is_empty());
        classifier.handle(&key(KEY_VOLUMEUP, 0), clock.at(400), &mut out);

        assert_eq!(
            out,
            vec![ClassifiedPress {
                channel: ButtonChannel::Up,
                kind: PressKind::Short,
                at: clock.at(400),
            }]
        );
        assert_eq!(classifier.next_deadline(), None);
    }

    #[test]
    fn held_past_threshold_is_long_exactly_once() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEDOWN, 1), clock.at(0), &mut out);
        assert_eq!(classifier.next_deadline(), Some(clock.at(500)));

        classifier.fire_due(clock.at(500), &mut out);
        assert_eq!(
            out,
            vec![ClassifiedPress {
                channel: ButtonChannel::Down,
                kind: PressKind::Long { held: T },
                at: clock.at(500),
            }]
        );
        // Deadline consumed; nothing more may fire.
        assert_eq!(classifier.next_deadline(), None);
        classifier.fire_due(clock.at(600), &mut out);
        assert_eq!(out.len(), 1);

        // The release after a long press emits nothing.
        classifier.handle(&key(KEY_VOLUMEDOWN, 0), clock.at(700), &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn deadline_not_due_does_not_fire() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEUP, 1), clock.at(0), &mut out);
        classifier.fire_due(clock.at(499), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn channels_are_independent() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        // Up is held the whole time; a full Down cycle happens inside [0, T).
        classifier.handle(&key(KEY_VOLUMEUP, 1), clock.at(0), &mut out);
        classifier.handle(&key(KEY_VOLUMEDOWN, 1), clock.at(100), &mut out);
        classifier.handle(&key(KEY_VOLUMEDOWN, 0), clock.at(200), &mut out);

        assert_eq!(
            out,
            vec![ClassifiedPress {
                channel: ButtonChannel::Down,
                kind: PressKind::Short,
                at: clock.at(200),
            }]
        );

        // The Up channel's deadline was not disturbed and still fires at T.
        assert_eq!(classifier.next_deadline(), Some(clock.at(500)));
        classifier.fire_due(clock.at(500), &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].channel, ButtonChannel::Up);
        assert!(out[1].is_long());
    }

    #[test]
    fn duplicate_down_rearms_instead_of_doubling() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEUP, 1), clock.at(0), &mut out);
        classifier.handle(&key(KEY_VOLUMEUP, 1), clock.at(100), &mut out);

        // The re-armed deadline governs timing: due at 600, not 500.
        assert_eq!(classifier.next_deadline(), Some(clock.at(600)));
        classifier.fire_due(clock.at(500), &mut out);
        assert!(out.is_empty());

        classifier.fire_due(clock.at(600), &mut out);
        classifier.handle(&key(KEY_VOLUMEUP, 0), clock.at(650), &mut out);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_long());
    }

    #[test]
    fn repeat_values_are_ignored() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEUP, 1), clock.at(0), &mut out);
        // Kernel auto-repeat chatter must not re-arm the deadline.
        classifier.handle(&key(KEY_VOLUMEUP, 2), clock.at(250), &mut out);
        classifier.handle(&key(KEY_VOLUMEUP, 2), clock.at(400), &mut out);
        assert_eq!(classifier.next_deadline(), Some(clock.at(500)));

        classifier.fire_due(clock.at(500), &mut out);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_long());
    }

    #[test]
    fn non_key_records_and_other_codes_are_discarded() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        // EV_SYN, EV_ABS, and a key we do not monitor.
        let mut syn = key(KEY_VOLUMEUP, 1);
        syn.event_type = 0;
        classifier.handle(&syn, clock.at(0), &mut out);
        let mut abs = key(KEY_VOLUMEUP, 1);
        abs.event_type = 3;
        classifier.handle(&abs, clock.at(0), &mut out);
        classifier.handle(&key(116, 1), clock.at(0), &mut out);

        assert!(out.is_empty());
        assert_eq!(classifier.next_deadline(), None);
    }

    #[test]
    fn release_without_press_emits_nothing() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEDOWN, 0), clock.at(0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn reset_silences_armed_channels() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEUP, 1), clock.at(0), &mut out);
        classifier.reset();

        assert_eq!(classifier.next_deadline(), None);
        classifier.fire_due(clock.at(1000), &mut out);
        classifier.handle(&key(KEY_VOLUMEUP, 0), clock.at(1000), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn back_to_back_cycles_each_classify_once() {
        let clock = Clock::new();
        let mut classifier = Classifier::new(T);
        let mut out = Vec::new();

        classifier.handle(&key(KEY_VOLUMEDOWN, 1), clock.at(0), &mut out);
        classifier.handle(&key(KEY_VOLUMEDOWN, 0), clock.at(100), &mut out);
        classifier.handle(&key(KEY_VOLUMEDOWN, 1), clock.at(150), &mut out);
        classifier.fire_due(clock.at(650), &mut out);
        classifier.handle(&key(KEY_VOLUMEDOWN, 0), clock.at(700), &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, PressKind::Short);
        assert_eq!(out[1].kind, PressKind::Long { held: T });
    }
}
