//! Progress Sink Port
//!
//! Receives human-readable progress messages from a database refresh.

/// Destination for refresh progress messages.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}
