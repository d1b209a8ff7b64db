// src/events/bus.rs

use tracing::trace;

use super::LifecycleEvent;

/// Receives lifecycle events.
pub trait Listener: Send {
    fn on_event(&mut self, event: &LifecycleEvent);
}

/// Synchronous dispatcher.
///
/// `dispatch` calls each listener in subscription order and returns after
/// the last one; listeners never run concurrently, so they can keep plain
/// mutable state.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn Listener>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    /// Builder-style [`EventBus::subscribe`].
    pub fn with(mut self, listener: impl Listener + 'static) -> Self {
        self.subscribe(Box::new(listener));
        self
    }

    pub fn dispatch(&mut self, event: &LifecycleEvent) {
        trace!(
            event = event.kind(),
            job = event.definition().name(),
            listeners = self.listeners.len(),
            "dispatching lifecycle event"
        );
        for listener in self.listeners.iter_mut() {
            listener.on_event(event);
        }
    }
}
