//! Unhandled-error hook: the terminal sink for failures nobody else took.

use std::rc::Rc;

use fanout_domain::record::ErrorRecord;

use crate::outcome::Outcome;

/// Shared handle to an unhandled-error hook.
///
/// Receives records when no error listener is registered, or when an error
/// listener itself failed.
pub type UnhandledErrorHook = Rc<dyn Fn(ErrorRecord) -> Outcome>;

/// Wrap any compatible closure into an [`UnhandledErrorHook`].
pub fn hook<F, R>(f: F) -> UnhandledErrorHook
where
    F: Fn(ErrorRecord) -> R + 'static,
    R: Into<Outcome>,
{
    Rc::new(move |record: ErrorRecord| -> Outcome { f(record).into() })
}

/// Hook that logs the record at `error` level.
#[allow(clippy::needless_pass_by_value)]
pub fn log_unhandled(record: ErrorRecord) -> Outcome {
    tracing::error!(
        listener = %record.listener.id,
        event = record.listener.event,
        channel = %record.listener.channel,
        occurred_at = %record.occurred_at,
        reason = %record.reason,
        "unhandled listener error"
    );
    Outcome::done()
}

/// Hook that discards the record.
#[allow(clippy::needless_pass_by_value)]
pub fn ignore_unhandled(_record: ErrorRecord) -> Outcome {
    Outcome::done()
}
