//! The privileged-bridge seam.
//!
//! On the devices PressUp targets there is no public API for reading the
//! volume buttons, so raw device access goes through an externally supplied
//! elevated-execution bridge. This module defines that seam: the detector only
//! ever sees the [`Bridge`] trait and the [`DeviceStream`] it hands back, and
//! never requests or manages elevation itself.
//!
//! The one concrete implementation shipped with the crate lives in
//! [`backends::shell`](crate::backends::shell) behind the `shell` feature.

use std::io::{self, Read};
use thiserror::Error;

/// Default directory holding input-device nodes.
pub const DEVICE_DIR: &str = "/dev/input";

/// Errors surfaced by detector start-up.
///
/// Expected runtime conditions (end-of-stream, transient empty reads) are not
/// errors; they are ordinary control flow inside the detector and show up to
/// the caller only as [`DetectorHandle::is_running`](crate::detector::DetectorHandle::is_running)
/// going false.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Scanning produced no usable device node, or every candidate failed to
    /// open.
    #[error("input device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The privileged bridge failed to execute an operation.
    #[error("privileged bridge failed: {0}")]
    Bridge(#[source] io::Error),
}

/// A live byte stream for one device node.
///
/// Wraps the reader the bridge produced plus an optional cancellation hook
/// used to unblock a reader thread stuck in a blocking `read` (e.g. by killing
/// the elevated child process behind the pipe).
pub struct DeviceStream {
    reader: Box<dyn Read + Send>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl DeviceStream {
    /// Stream with no cancellation hook.
    ///
    /// A detector on such a stream can only unblock when the stream yields
    /// bytes or ends; prefer [`DeviceStream::with_cancel`] for real devices.
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            cancel: None,
        }
    }

    /// Stream with a cancellation hook invoked on [`stop`](crate::detector::DetectorHandle::stop).
    pub fn with_cancel(
        reader: impl Read + Send + 'static,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            cancel: Some(Box::new(cancel)),
        }
    }

    pub(crate) fn into_parts(self) -> (Box<dyn Read + Send>, Option<Box<dyn FnOnce() + Send>>) {
        (self.reader, self.cancel)
    }
}

impl std::fmt::Debug for DeviceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceStream")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// Elevated-execution collaborator.
///
/// Implementations own whatever privilege they need; PressUp neither requests
/// nor escalates privileges on its own. Both operations are synchronous.
pub trait Bridge: Send + Sync {
    /// List entry names visible under `dir`.
    fn list_dir(&self, dir: &str) -> io::Result<Vec<String>>;

    /// Open a live, readable byte stream equivalent to continuously reading
    /// the raw device node at `path`.
    fn open_stream(&self, path: &str) -> io::Result<DeviceStream>;
}
