//! Event: a named channel with a statically known argument type.
//!
//! Each event is a marker type. Its [`Event::Args`] fixes what every listener
//! receives, so a listener registered for one event can never be handed the
//! payload of another.

/// A dispatchable event.
///
/// ```
/// use fanout_domain::event::Event;
///
/// struct Greeted;
///
/// impl Event for Greeted {
///     type Args = (String, String);
///     const NAME: &'static str = "greeted";
/// }
/// ```
pub trait Event: 'static {
    /// Payload passed by reference to every listener of this event.
    type Args: 'static;

    /// Stable, human-readable name used in logs and error records.
    const NAME: &'static str;
}
