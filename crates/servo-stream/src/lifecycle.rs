use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable run/stop flag shared between the publish loop and an external
/// stop trigger (e.g. a signal handler).
///
/// The loop polls the flag once per tick boundary; an in-flight read is
/// allowed to complete before the flag is observed.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    running: Arc<AtomicBool>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Request shutdown. Safe to call repeatedly, and before the loop has
    /// finished setup.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
