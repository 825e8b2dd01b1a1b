//! Outcome: what a listener hands back when it is invoked.
//!
//! A listener either finishes on the spot ([`Outcome::Ready`]) or returns a
//! future the emitter awaits later ([`Outcome::Pending`]). Plain `()` and
//! `Result<(), anyhow::Error>` convert into a ready outcome, so synchronous
//! listeners never have to name this type.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

/// Result produced by a listener once it has run to completion.
pub type ListenerResult = Result<(), anyhow::Error>;

/// Future handed back by an asynchronous listener.
pub type ListenerFuture = LocalBoxFuture<'static, ListenerResult>;

/// Value returned by a listener invocation.
pub enum Outcome {
    /// The listener already finished.
    Ready(ListenerResult),
    /// The listener finishes when this future resolves.
    Pending(ListenerFuture),
}

impl Outcome {
    /// A ready, successful outcome.
    #[must_use]
    pub fn done() -> Self {
        Self::Ready(Ok(()))
    }

    /// Wrap a future the emitter should await.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = ListenerResult> + 'static,
    {
        Self::Pending(future.boxed_local())
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Drive the outcome to its final result.
    pub async fn resolve(self) -> ListenerResult {
        match self {
            Self::Ready(result) => result,
            Self::Pending(future) => future.await,
        }
    }
}

impl From<()> for Outcome {
    fn from((): ()) -> Self {
        Self::done()
    }
}

impl From<ListenerResult> for Outcome {
    fn from(result: ListenerResult) -> Self {
        Self::Ready(result)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}
