//! Failure reasons captured from listeners.
//!
//! A listener fails either by returning an error (synchronously or from its
//! future) or by panicking. Both end up as a [`Failure`] inside an
//! [`ErrorRecord`](crate::record::ErrorRecord).

use std::any::Any;
use std::fmt::{Debug, Display};

/// The captured reason a listener did not complete.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// The listener returned an error.
    #[error(transparent)]
    Error(#[from] anyhow::Error),

    /// The listener panicked while being invoked or polled.
    #[error("listener panicked: {0}")]
    Panic(String),
}

impl Failure {
    /// Build a failure from a payload caught by `catch_unwind`.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panic(message)
    }

    /// Whether the listener panicked rather than returning an error.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }

    /// Access the underlying error as a concrete type, if it is one.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        match self {
            Self::Error(err) => err.downcast_ref::<E>(),
            Self::Panic(_) => None,
        }
    }
}
