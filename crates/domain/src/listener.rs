//! Listener metadata: what an error record says about who failed.

use std::fmt;

use crate::id::ListenerId;

/// Which table a listener was registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// An ordinary event channel.
    Event,
    /// The reserved error channel.
    Error,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => f.write_str("event"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Immutable description of a registered listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerInfo {
    pub id: ListenerId,
    /// Name of the event the listener is registered for (`"error"` on the
    /// error channel).
    pub event: &'static str,
    pub channel: Channel,
}

impl ListenerInfo {
    /// Describe a fresh listener on an event channel.
    #[must_use]
    pub fn for_event(event: &'static str) -> Self {
        Self {
            id: ListenerId::new(),
            event,
            channel: Channel::Event,
        }
    }

    /// Describe a fresh listener on the error channel.
    #[must_use]
    pub fn for_error() -> Self {
        Self {
            id: ListenerId::new(),
            event: "error",
            channel: Channel::Error,
        }
    }

    #[must_use]
    pub fn is_error_listener(&self) -> bool {
        self.channel == Channel::Error
    }
}

impl fmt::Display for ListenerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener {} on `{}`", self.channel, self.id, self.event)
    }
}
