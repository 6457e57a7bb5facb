use crate::event::{ClassifiedPress, PressKind};
use crate::eventbus::PressListener;

/// A simple listener that logs every classified press via the `log` facade.
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl PressListener for Logger {
    fn on_press(&mut self, press: &ClassifiedPress) {
        match press.kind {
            PressKind::Short => log::info!("short press on {:?}", press.channel),
            PressKind::Long { held } => log::info!(
                "long press on {:?} ({} ms)",
                press.channel,
                held.as_millis()
            ),
        }
    }
}
