//! Elevated-shell bridge.
//!
//! Drives the device's `su` binary for each privileged operation: `ls` for the
//! directory listing and `cat` for the live byte stream. Whether elevation is
//! actually granted is entirely between `su` and the user; if the request is
//! denied the commands simply fail and the bridge reports an ordinary
//! [`io::Error`].
//!
//! The stream handed back by [`open_stream`](ShellBridge::open_stream) is the
//! piped stdout of a long-lived `su -c "cat <node>"` child. Its cancellation
//! hook kills and reaps that child, which is what unblocks a reader thread
//! stuck in a blocking read when the detector is stopped.

use crate::bridge::{Bridge, DeviceStream};
use std::io;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

/// [`Bridge`] implementation backed by an elevated shell.
#[derive(Clone, Debug)]
pub struct ShellBridge {
    su: String,
}

impl ShellBridge {
    /// Bridge using the `su` binary found on `PATH`.
    pub fn new() -> Self {
        Self { su: "su".to_string() }
    }

    /// Bridge using an explicit `su` binary path.
    pub fn with_su(su: impl Into<String>) -> Self {
        Self { su: su.into() }
    }
}

impl Default for ShellBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge for ShellBridge {
    fn list_dir(&self, dir: &str) -> io::Result<Vec<String>> {
        let output = Command::new(&self.su)
            .arg("-c")
            .arg(format!("ls {dir}"))
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("`su -c ls {dir}` exited with {}", output.status),
            ));
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing.split_whitespace().map(str::to_string).collect())
    }

    fn open_stream(&self, path: &str) -> io::Result<DeviceStream> {
        let mut child = Command::new(&self.su)
            .arg("-c")
            .arg(format!("cat {path}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = child.stdout.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "child stdout not captured")
        })?;

        let child = Arc::new(Mutex::new(child));
        Ok(DeviceStream::with_cancel(stdout, move || {
            if let Ok(mut child) = child.lock() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }))
    }
}
