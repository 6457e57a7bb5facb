//! Running detector instance.
//!
//! [`PressDetector::start`] spawns two threads per instance:
//! - a **reader** performing blocking reads against the device byte stream and
//!   decoding 24-byte records (the sole producer of raw events), and
//! - a **worker** owning the [`Classifier`]. Decoded events and long-press
//!   deadlines are funneled through the worker's single queue
//!   (`recv_timeout` against the earliest deadline), so a key-up and a timer
//!   fire for the same channel can never interleave.
//!
//! The worker is the only emitter of [`ClassifiedPress`]; once
//! [`DetectorHandle::stop`] has joined it, no further press can appear on the
//! output channel.
//!
//! ## Empty reads vs. stream end
//! `Read` cannot distinguish "no data yet" from "closed" on every transport,
//! so an end-of-stream from the decoder is first treated as transient: the
//! reader sleeps [`DetectorConfig::retry_ms`] and retries. Once
//! [`DetectorConfig::retry_budget`] consecutive empty reads accumulate the
//! stream is declared ended and the detector stops on its own.

use crate::bridge::{Bridge, DetectorError, DeviceStream};
use crate::classifier::Classifier;
use crate::codec;
use crate::event::{ClassifiedPress, RawEvent};
use crate::scanner;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Detector tuning knobs.
///
/// All durations are plain milliseconds so the struct round-trips through
/// TOML untouched. Unset fields take their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Hold duration separating short from long presses, in milliseconds.
    pub threshold_ms: u64,
    /// Delay between retries after a transient empty read, in milliseconds.
    pub retry_ms: u64,
    /// Consecutive empty reads tolerated before the stream counts as ended.
    pub retry_budget: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 500,
            retry_ms: 20,
            retry_budget: 50,
        }
    }
}

impl DetectorConfig {
    /// The long-press threshold as a [`Duration`].
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }

    /// The empty-read retry interval as a [`Duration`].
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

enum Msg {
    Event(RawEvent),
    StreamEnded,
    Stop,
}

/// Entry point for starting detectors.
///
/// Each started detector is its own instance with its own handle; there is no
/// process-wide running flag, so independent detectors (including several
/// under test) cannot interfere with one another.
pub struct PressDetector;

impl PressDetector {
    /// Open `path` through `bridge` and start detection on it.
    pub fn start(
        bridge: &dyn Bridge,
        path: &str,
        config: DetectorConfig,
    ) -> Result<DetectorHandle, DetectorError> {
        let stream = bridge.open_stream(path).map_err(DetectorError::Bridge)?;
        log::info!("press detection started on {path}");
        Ok(Self::start_with_stream(stream, config))
    }

    /// Scan for candidate nodes and start on the first one that opens.
    pub fn start_first(
        bridge: &dyn Bridge,
        config: DetectorConfig,
    ) -> Result<DetectorHandle, DetectorError> {
        let devices = scanner::scan(bridge);
        if devices.is_empty() {
            return Err(DetectorError::DeviceUnavailable(
                "no event nodes found".into(),
            ));
        }
        for device in &devices {
            match bridge.open_stream(&device.path) {
                Ok(stream) => {
                    log::info!("press detection started on {}", device.path);
                    return Ok(Self::start_with_stream(stream, config));
                }
                Err(err) => log::warn!("could not open {}: {err}", device.path),
            }
        }
        Err(DetectorError::DeviceUnavailable(format!(
            "none of {} candidate node(s) could be opened",
            devices.len()
        )))
    }

    /// Start detection over an already opened stream.
    pub fn start_with_stream(stream: DeviceStream, config: DetectorConfig) -> DetectorHandle {
        let (reader, cancel) = stream.into_parts();
        let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
        let (out_tx, out_rx) = mpsc::channel::<ClassifiedPress>();
        let running = Arc::new(AtomicBool::new(true));

        let reader_thread = thread::Builder::new()
            .name("pressup-reader".into())
            .spawn({
                let tx = msg_tx.clone();
                let running = Arc::clone(&running);
                move || reader_loop(reader, tx, config, running)
            })
            .ok();

        let worker_thread = thread::Builder::new()
            .name("pressup-worker".into())
            .spawn({
                let running = Arc::clone(&running);
                move || worker_loop(msg_rx, out_tx, config, running)
            })
            .ok();

        DetectorHandle {
            events: out_rx,
            ctl: msg_tx,
            running,
            cancel,
            reader: reader_thread,
            worker: worker_thread,
        }
    }
}

/// Handle to one running detector.
///
/// Dropping the handle stops the detector; see [`DetectorHandle::stop`] for
/// the exact cancellation contract.
pub struct DetectorHandle {
    events: Receiver<ClassifiedPress>,
    ctl: Sender<Msg>,
    running: Arc<AtomicBool>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
    reader: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<()>>,
}

impl DetectorHandle {
    /// The ordered output stream of classified presses.
    pub fn events(&self) -> &Receiver<ClassifiedPress> {
        &self.events
    }

    /// Wait up to `timeout` for the next classified press.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ClassifiedPress, RecvTimeoutError> {
        self.events.recv_timeout(timeout)
    }

    /// `false` once the detector has stopped, whether via [`stop`](Self::stop)
    /// or because the device stream ended.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the detector.
    ///
    /// Cancels the device stream so a blocked read unblocks, disarms every
    /// outstanding long-press deadline, and joins both threads. When this
    /// returns, no further [`ClassifiedPress`] can be emitted. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Fails only if the worker already exited; fine either way.
        let _ = self.ctl.send(Msg::Stop);
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for DetectorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reader_loop(
    mut reader: Box<dyn Read + Send>,
    tx: Sender<Msg>,
    config: DetectorConfig,
    running: Arc<AtomicBool>,
) {
    let mut empty_reads: u32 = 0;
    while running.load(Ordering::SeqCst) {
        match codec::read_event(reader.as_mut()) {
            Some(event) => {
                empty_reads = 0;
                #[cfg(all(feature = "debug-log", debug_assertions))]
                eprintln!("[RAW/READ] {event:?}");
                if tx.send(Msg::Event(event)).is_err() {
                    break;
                }
            }
            None => {
                empty_reads += 1;
                if empty_reads > config.retry_budget {
                    let _ = tx.send(Msg::StreamEnded);
                    break;
                }
                thread::sleep(config.retry_interval());
            }
        }
    }
}

fn worker_loop(
    rx: Receiver<Msg>,
    out: Sender<ClassifiedPress>,
    config: DetectorConfig,
    running: Arc<AtomicBool>,
) {
    let mut classifier = Classifier::new(config.threshold());
    let mut emitted = Vec::new();

    loop {
        let msg = if let Some(deadline) = classifier.next_deadline() {
            let now = Instant::now();
            if deadline <= now {
                classifier.fire_due(now, &mut emitted);
                if !flush(&out, &mut emitted) {
                    break;
                }
                continue;
            }
            match rx.recv_timeout(deadline - now) {
                Ok(msg) => msg,
                // Deadline due; handled at the top of the next iteration.
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            }
        };

        match msg {
            Msg::Event(event) => {
                classifier.handle(&event, Instant::now(), &mut emitted);
                if !flush(&out, &mut emitted) {
                    break;
                }
            }
            Msg::StreamEnded => {
                log::warn!("device stream ended; detector stopping");
                break;
            }
            Msg::Stop => break,
        }
    }

    classifier.reset();
    running.store(false, Ordering::SeqCst);
}

/// Forward classified presses to the output channel.
///
/// Returns `false` when the receiving side is gone and the worker should wind
/// down.
fn flush(out: &Sender<ClassifiedPress>, emitted: &mut Vec<ClassifiedPress>) -> bool {
    for press in emitted.drain(..) {
        log::debug!("classified {:?} press on {:?}", press.kind, press.channel);
        if out.send(press).is_err() {
            return false;
        }
    }
    true
}
