//! Stdout Progress Sink
//!
//! Default progress sink used when a refresh caller supplies none.

use crate::domain::ports::ProgressSink;

/// Tag prepended to every progress line.
pub const PROGRESS_PREFIX: &str = "[GeoLite2]";

/// Writes progress messages to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl StdoutProgress {
    pub fn format(message: &str) -> String {
        format!("{} {}", PROGRESS_PREFIX, message)
    }
}

impl ProgressSink for StdoutProgress {
    fn report(&self, message: &str) {
        println!("{}", Self::format(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_adds_prefix() {
        assert_eq!(
            StdoutProgress::format("Download complete."),
            "[GeoLite2] Download complete."
        );
    }

    #[test]
    fn test_closure_is_a_progress_sink() {
        let seen = parking_lot::Mutex::new(Vec::new());
        let sink = |message: &str| seen.lock().push(message.to_string());

        sink.report("one");
        sink.report("two");
        assert_eq!(*seen.lock(), vec!["one".to_string(), "two".to_string()]);
    }
}
