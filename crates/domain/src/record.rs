//! Error record: the payload delivered to error listeners and to the
//! unhandled-error hook.

use std::fmt;

use crate::error::Failure;
use crate::listener::ListenerInfo;
use crate::time::{Timestamp, now};

/// A listener failure paired with the listener that produced it.
///
/// Exactly one record is built per failure.
#[derive(Debug)]
pub struct ErrorRecord {
    pub listener: ListenerInfo,
    pub reason: Failure,
    pub occurred_at: Timestamp,
}

impl ErrorRecord {
    /// Capture a failure, stamping it with the current time.
    #[must_use]
    pub fn new(listener: ListenerInfo, reason: impl Into<Failure>) -> Self {
        Self {
            listener,
            reason: reason.into(),
            occurred_at: now(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.listener, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_listener_and_reason() {
        let info = ListenerInfo::for_event("hello");
        let record = ErrorRecord::new(info.clone(), anyhow::anyhow!("x"));
        assert_eq!(record.listener, info);
        assert_eq!(record.reason.to_string(), "x");
    }

    #[test]
    fn should_stamp_capture_time() {
        let before = now();
        let record = ErrorRecord::new(ListenerInfo::for_error(), Failure::Panic("p".into()));
        assert!(record.occurred_at >= before);
    }

    #[test]
    fn should_display_listener_and_reason() {
        let record = ErrorRecord::new(ListenerInfo::for_event("hello"), anyhow::anyhow!("x"));
        let text = record.to_string();
        assert!(text.contains("on `hello` failed: x"));
    }
}
