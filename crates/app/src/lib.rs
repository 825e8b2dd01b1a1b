//! # fanout-app
//!
//! In-process, typed publish/subscribe dispatcher.
//!
//! ## Responsibilities
//! - Own the **listener table** (`subscribe`, `subscribe_async`, `subscribe_error`)
//! - Run **two-phase dispatch**: synchronous fan-out, then awaited settlement
//!   in registration order
//! - Contain every listener failure and **escalate** it to the error channel,
//!   or to the per-instance unhandled-error hook
//!
//! ## Dependency rule
//! Depends on `fanout-domain` only (plus `futures` for boxed local futures).
//! No async runtime is required; `dispatch` runs on whatever executor polls it.

pub mod emitter;
pub mod hook;
mod listener;
pub mod outcome;

pub use emitter::{Emitter, EmitterBuilder};
pub use hook::UnhandledErrorHook;
pub use outcome::{ListenerFuture, ListenerResult, Outcome};
