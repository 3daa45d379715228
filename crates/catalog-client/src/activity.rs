use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// ActivityMonitor records whether at least one request was actually sent
/// over the current channel. A connection that was opened but never carried
/// a request needs extra care on teardown: see
/// [`ServiceProxy::close`](crate::ServiceProxy::close).
///
/// The flag is meaningful only while a channel exists. It's reset exactly
/// when a new channel is created, and set by the channel's request
/// interceptor on the first request sent over that channel.
#[derive(Debug, Default)]
pub struct ActivityMonitor {
    sent: Arc<AtomicBool>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the flag. Called when a new channel is created.
    pub fn reset(&self) {
        self.sent.store(false, Ordering::Relaxed);
    }

    /// Whether a request was sent over the current channel.
    pub fn request_sent(&self) -> bool {
        self.sent.load(Ordering::Relaxed)
    }

    /// A handle for the channel to mark requests as they're sent.
    pub fn handle(&self) -> ActivityHandle {
        ActivityHandle {
            sent: Arc::clone(&self.sent),
        }
    }
}

/// Write handle of an [`ActivityMonitor`], held by the channel.
#[derive(Debug, Clone)]
pub struct ActivityHandle {
    sent: Arc<AtomicBool>,
}

impl ActivityHandle {
    /// Record that a request was sent.
    pub fn mark(&self) {
        self.sent.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_and_resets() {
        let monitor = ActivityMonitor::new();
        assert!(!monitor.request_sent());

        let handle = monitor.handle();
        handle.mark();
        assert!(monitor.request_sent());

        monitor.reset();
        assert!(!monitor.request_sent());

        // A handle taken before the reset still addresses the same flag.
        handle.mark();
        assert!(monitor.request_sent());
    }
}
