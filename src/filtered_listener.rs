use crate::event::ClassifiedPress;
use crate::eventbus::PressListener;

/// Wraps a listener and filters presses based on a user-supplied predicate.
///
/// Useful when [`PressFilter`](crate::eventbus::PressFilter) variants are not
/// expressive enough and the closure needs captured state.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&ClassifiedPress) -> bool + Send + Sync>,
    inner: Box<dyn PressListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&ClassifiedPress) -> bool + Send + Sync + 'static,
        inner: Box<dyn PressListener>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner,
        }
    }
}

impl PressListener for FilteredListener {
    fn on_press(&mut self, press: &ClassifiedPress) {
        if (self.predicate)(press) {
            self.inner.on_press(press);
        }
    }
}
