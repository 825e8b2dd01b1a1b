//! In-process event emitter with per-listener failure containment.
//!
//! ## Dispatch
//! ```text
//! dispatch(event, args)
//!     │
//!     ├─ phase A: invoke every listener in registration order
//!     │     ├─ ready ok     → done
//!     │     ├─ pending      → slot kept for phase B
//!     │     └─ err / panic  → escalate, resume with the next listener
//!     │
//!     └─ phase B: poll every pending slot together, observe results
//!        in registration order
//!           └─ err / panic  → escalate
//!
//! escalate(listener, reason)
//!     ├─ no error listeners → unhandled-error hook
//!     └─ each error listener in order
//!           └─ err / panic  → unhandled-error hook (never the error channel)
//! ```
//!
//! ## Rules
//! - A failing listener never stops its siblings
//! - `dispatch` always resolves; failures only surface through error
//!   listeners and the unhandled-error hook
//! - Listener futures make progress concurrently; their settlement is
//!   observed in registration order, so escalation order is deterministic
//!   whatever the completion order
//! - Each dispatch works on a snapshot of the table; subscribing from inside
//!   a listener affects later dispatches only
//!
//! The emitter is single-threaded (`!Send`). Futures returned by listeners are
//! awaited on the caller's task; nothing is spawned.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use fanout_domain::error::Failure;
use fanout_domain::event::Event;
use fanout_domain::id::ListenerId;
use fanout_domain::listener::ListenerInfo;
use fanout_domain::record::ErrorRecord;
use futures::StreamExt;
use futures::stream::FuturesOrdered;

use crate::hook::{UnhandledErrorHook, hook, log_unhandled};
use crate::listener::{ListenerEntry, settle};
use crate::outcome::{ListenerFuture, ListenerResult, Outcome};

type Sequence<A> = Vec<Rc<ListenerEntry<A>>>;

/// A listener future awaiting phase B, with the listener it came from.
type Slot<'l> = (&'l ListenerInfo, ListenerFuture);

/// Typed publish/subscribe dispatcher.
pub struct Emitter {
    /// `TypeId` of the event → `Sequence<E::Args>`.
    listeners: RefCell<HashMap<TypeId, Box<dyn Any>>>,
    error_listeners: RefCell<Sequence<ErrorRecord>>,
    on_unhandled_error: RefCell<UnhandledErrorHook>,
}

impl Emitter {
    /// Create an emitter whose unhandled-error hook is
    /// [`default_unhandled_error`](Self::default_unhandled_error).
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> EmitterBuilder {
        EmitterBuilder::default()
    }

    /// Type-level fallback every emitter starts with: log the record.
    #[allow(clippy::needless_pass_by_value)]
    pub fn default_unhandled_error(record: ErrorRecord) -> Outcome {
        log_unhandled(record)
    }

    /// Register a listener for `E`.
    ///
    /// The callback may return `()`, a `Result<(), anyhow::Error>`, or an
    /// [`Outcome::Pending`] future. Listeners run in registration order;
    /// registering the same closure twice runs it twice.
    #[allow(clippy::needless_pass_by_value)]
    pub fn subscribe<E, F, R>(&self, _event: E, callback: F) -> ListenerId
    where
        E: Event,
        F: Fn(&Emitter, &E::Args) -> R + 'static,
        R: Into<Outcome>,
    {
        let info = ListenerInfo::for_event(E::NAME);
        let id = info.id;
        let entry = Rc::new(ListenerEntry::new(
            info,
            Box::new(move |emitter: &Emitter, args: &E::Args| -> Outcome {
                callback(emitter, args).into()
            }),
        ));

        let mut table = self.listeners.borrow_mut();
        let slot = table
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Sequence::<E::Args>::new()));
        if let Some(sequence) = slot.downcast_mut::<Sequence<E::Args>>() {
            sequence.push(entry);
        }

        tracing::trace!(event = E::NAME, listener = %id, "listener subscribed");
        id
    }

    /// Register a listener for `E` that always completes asynchronously.
    pub fn subscribe_async<E, F, Fut>(&self, event: E, callback: F) -> ListenerId
    where
        E: Event,
        F: Fn(&Emitter, &E::Args) -> Fut + 'static,
        Fut: Future<Output = ListenerResult> + 'static,
    {
        self.subscribe(event, move |emitter: &Emitter, args: &E::Args| {
            Outcome::pending(callback(emitter, args))
        })
    }

    /// Register a listener on the reserved error channel.
    ///
    /// It receives one [`ErrorRecord`] per listener failure. If it fails in
    /// turn, that failure goes to the unhandled-error hook.
    pub fn subscribe_error<F, R>(&self, callback: F) -> ListenerId
    where
        F: Fn(&Emitter, &ErrorRecord) -> R + 'static,
        R: Into<Outcome>,
    {
        let info = ListenerInfo::for_error();
        let id = info.id;
        self.error_listeners
            .borrow_mut()
            .push(Rc::new(ListenerEntry::new(
                info,
                Box::new(move |emitter: &Emitter, record: &ErrorRecord| -> Outcome {
                    callback(emitter, record).into()
                }),
            )));

        tracing::trace!(listener = %id, "error listener subscribed");
        id
    }

    /// Replace this emitter's unhandled-error hook.
    pub fn set_unhandled_error_hook<F, R>(&self, f: F)
    where
        F: Fn(ErrorRecord) -> R + 'static,
        R: Into<Outcome>,
    {
        *self.on_unhandled_error.borrow_mut() = hook(f);
    }

    /// Restore [`default_unhandled_error`](Self::default_unhandled_error).
    pub fn reset_unhandled_error_hook(&self) {
        *self.on_unhandled_error.borrow_mut() = default_hook();
    }

    /// Number of listeners registered for `E`.
    #[must_use]
    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners
            .borrow()
            .get(&TypeId::of::<E>())
            .and_then(|slot| slot.downcast_ref::<Sequence<E::Args>>())
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn has_listeners<E: Event>(&self) -> bool {
        self.listener_count::<E>() > 0
    }

    #[must_use]
    pub fn error_listener_count(&self) -> usize {
        self.error_listeners.borrow().len()
    }

    /// Invoke every listener of `E` with `args` and wait for all of them.
    ///
    /// Never fails: listener errors and panics are routed to the error
    /// channel or, failing that, the unhandled-error hook. A listener future
    /// that never resolves keeps this future pending forever.
    #[allow(clippy::needless_pass_by_value)]
    pub async fn dispatch<E: Event>(&self, _event: E, args: E::Args) {
        let Some(listeners) = self.snapshot::<E>() else {
            tracing::trace!(event = E::NAME, "no listeners");
            return;
        };
        tracing::debug!(event = E::NAME, listeners = listeners.len(), "dispatching");

        let mut pending = Vec::new();
        let mut next = 0;
        while next < listeners.len() {
            match self.fan_out(&listeners[next..], &args, &mut pending) {
                Ok(()) => break,
                Err((offset, reason)) => {
                    let failed = next + offset;
                    self.escalate(listeners[failed].info.clone(), reason).await;
                    next = failed + 1;
                }
            }
        }

        // FuturesOrdered polls every slot but yields in push order.
        let mut settling: FuturesOrdered<_> = pending
            .into_iter()
            .map(|(info, future)| async move { (info, settle(future).await) })
            .collect();
        while let Some((info, result)) = settling.next().await {
            if let Err(reason) = result {
                self.escalate(info.clone(), reason).await;
            }
        }
    }

    fn snapshot<E: Event>(&self) -> Option<Sequence<E::Args>> {
        let table = self.listeners.borrow();
        let sequence = table
            .get(&TypeId::of::<E>())?
            .downcast_ref::<Sequence<E::Args>>()?;
        (!sequence.is_empty()).then(|| sequence.clone())
    }

    /// Invoke `listeners` in order, collecting pending futures.
    ///
    /// Stops at the first synchronous failure and returns its offset in
    /// `listeners` so the caller can escalate and resume after it.
    fn fan_out<'l, A: 'static>(
        &self,
        listeners: &'l [Rc<ListenerEntry<A>>],
        args: &A,
        pending: &mut Vec<Slot<'l>>,
    ) -> Result<(), (usize, Failure)> {
        for (offset, entry) in listeners.iter().enumerate() {
            match entry.invoke(self, args) {
                Ok(Some(future)) => pending.push((&entry.info, future)),
                Ok(None) => {}
                Err(reason) => return Err((offset, reason)),
            }
        }
        Ok(())
    }

    async fn escalate(&self, listener: ListenerInfo, reason: Failure) {
        let record = ErrorRecord::new(listener, reason);
        let error_listeners = self.error_listeners.borrow().clone();

        if error_listeners.is_empty() {
            self.report_unhandled(record).await;
            return;
        }

        tracing::debug!(
            listener = %record.listener.id,
            event = record.listener.event,
            error_listeners = error_listeners.len(),
            "escalating listener failure"
        );
        for entry in &error_listeners {
            if let Err(secondary) = entry.run(self, &record).await {
                tracing::warn!(
                    listener = %entry.info.id,
                    reason = %secondary,
                    "error listener failed"
                );
                self.report_unhandled(ErrorRecord::new(entry.info.clone(), secondary))
                    .await;
            }
        }
    }

    /// Hand a record to the unhandled-error hook.
    ///
    /// The hook is the terminal sink: if its own outcome is an error, that
    /// error is logged and dropped. A panicking hook is not caught.
    async fn report_unhandled(&self, record: ErrorRecord) {
        let sink = self.on_unhandled_error.borrow().clone();
        if let Err(err) = sink(record).resolve().await {
            tracing::error!(error = %err, "unhandled-error hook failed");
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("events", &self.listeners.borrow().len())
            .field("error_listeners", &self.error_listener_count())
            .finish_non_exhaustive()
    }
}

fn default_hook() -> UnhandledErrorHook {
    Rc::new(Emitter::default_unhandled_error)
}

/// Step-by-step builder for [`Emitter`].
#[derive(Default)]
pub struct EmitterBuilder {
    on_unhandled_error: Option<UnhandledErrorHook>,
}

impl EmitterBuilder {
    /// Use `f` instead of the default logging hook.
    #[must_use]
    pub fn on_unhandled_error<F, R>(mut self, f: F) -> Self
    where
        F: Fn(ErrorRecord) -> R + 'static,
        R: Into<Outcome>,
    {
        self.on_unhandled_error = Some(hook(f));
        self
    }

    /// Use an already shared hook.
    #[must_use]
    pub fn unhandled_error_hook(mut self, hook: UnhandledErrorHook) -> Self {
        self.on_unhandled_error = Some(hook);
        self
    }

    #[must_use]
    pub fn build(self) -> Emitter {
        Emitter {
            listeners: RefCell::new(HashMap::new()),
            error_listeners: RefCell::new(Vec::new()),
            on_unhandled_error: RefCell::new(self.on_unhandled_error.unwrap_or_else(default_hook)),
        }
    }
}

impl fmt::Debug for EmitterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterBuilder")
            .field("on_unhandled_error", &self.on_unhandled_error.is_some())
            .finish()
    }
}
