//! Bridge backends for `pressup`.
//!
//! Implementations of [`Bridge`](crate::bridge::Bridge) over concrete
//! elevated-execution mechanisms.
//!
//! # Feature flags
//! - **`shell`** — the elevated-shell bridge driving the device's `su` binary
//!   (default in this build).
//!
//! PressUp reads input devices through a bridge; it never escalates privileges
//! itself. Hosts with their own elevation mechanism (a privileged daemon, a
//! test harness) implement [`Bridge`](crate::bridge::Bridge) directly instead.

#[cfg(feature = "shell")]
#[cfg_attr(docsrs, doc(cfg(feature = "shell")))]
pub mod shell;
