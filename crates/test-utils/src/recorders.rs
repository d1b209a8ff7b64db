use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobscreen::events::{LifecycleEvent, Listener, RestartScheduler};
use jobscreen::job::Definition;

/// Scheduler that remembers what it was asked to restart instead of
/// launching anything.
#[derive(Debug, Clone)]
pub struct RecordingScheduler {
    scheduled: Arc<Mutex<Vec<(String, Duration)>>>,
    succeed: bool,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self {
            scheduled: Arc::new(Mutex::new(Vec::new())),
            succeed: true,
        }
    }

    /// A scheduler whose launches always fail.
    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::new()
        }
    }

    pub fn scheduled(&self) -> Vec<(String, Duration)> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn scheduled_names(&self) -> Vec<String> {
        self.scheduled().into_iter().map(|(name, _)| name).collect()
    }
}

impl Default for RecordingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RestartScheduler for RecordingScheduler {
    fn schedule(&self, definition: &Definition, delay: Duration) -> bool {
        self.scheduled
            .lock()
            .unwrap()
            .push((definition.name().to_string(), delay));
        self.succeed
    }
}

/// Listener that keeps a copy of every event it sees.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.kind()).collect()
    }
}

impl Listener for RecordingListener {
    fn on_event(&mut self, event: &LifecycleEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
