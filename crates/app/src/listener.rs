//! Listener entries and the per-invocation failure isolation.
//!
//! Both invocation and polling run under `catch_unwind`, so a panicking
//! listener is captured as a [`Failure`] like any returned error.
//!
//! **Warning**: `AssertUnwindSafe` is used. A listener that panics while
//! holding a `RefCell` borrow or a lock may leave that state inconsistent.

use std::panic::{self, AssertUnwindSafe};

use fanout_domain::error::Failure;
use fanout_domain::listener::ListenerInfo;
use futures::FutureExt;

use crate::emitter::Emitter;
use crate::outcome::{ListenerFuture, Outcome};

pub(crate) type Callback<A> = Box<dyn Fn(&Emitter, &A) -> Outcome>;

/// A registered listener. Immutable once created.
pub(crate) struct ListenerEntry<A: 'static> {
    pub(crate) info: ListenerInfo,
    callback: Callback<A>,
}

impl<A: 'static> ListenerEntry<A> {
    pub(crate) fn new(info: ListenerInfo, callback: Callback<A>) -> Self {
        Self { info, callback }
    }

    /// Call the listener synchronously.
    ///
    /// Returns the future to await later when the listener is asynchronous,
    /// `None` when it already finished.
    pub(crate) fn invoke(
        &self,
        emitter: &Emitter,
        args: &A,
    ) -> Result<Option<ListenerFuture>, Failure> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(emitter, args))) {
            Ok(Outcome::Ready(Ok(()))) => Ok(None),
            Ok(Outcome::Ready(Err(err))) => Err(Failure::Error(err)),
            Ok(Outcome::Pending(future)) => Ok(Some(future)),
            Err(payload) => Err(Failure::from_panic(payload)),
        }
    }

    /// Invoke, then await the returned future if there is one.
    pub(crate) async fn run(&self, emitter: &Emitter, args: &A) -> Result<(), Failure> {
        match self.invoke(emitter, args)? {
            Some(future) => settle(future).await,
            None => Ok(()),
        }
    }
}

/// Await a listener future, converting errors and panics into a [`Failure`].
pub(crate) async fn settle(future: ListenerFuture) -> Result<(), Failure> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Failure::Error(err)),
        Err(payload) => Err(Failure::from_panic(payload)),
    }
}
