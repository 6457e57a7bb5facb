//! PressUp — volume-button press detection over a privileged byte stream.
//!
//! Turns the raw binary event output of a kernel input-device node into a
//! stream of classified short/long volume-button presses, for platforms that
//! expose no public API for remapping those buttons. Device access goes
//! through an externally supplied elevated-execution bridge; this crate only
//! scans for device nodes, decodes the 24-byte event records, and runs one
//! independent press state machine per volume channel.

pub mod backends;
pub mod bridge;
pub mod classifier;
pub mod codec;
pub mod detector;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod logger;
pub mod scanner;

pub use bridge::*;
pub use classifier::*;
pub use detector::*;
pub use event::*;
pub use eventbus::*;
pub use scanner::*;
