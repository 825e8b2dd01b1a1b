//! # fanout-domain
//!
//! Pure domain model for the fanout event dispatcher.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, timestamps
//! - Define the **Event** trait (marker type → argument type)
//! - Define **listener metadata** (id, event name, channel)
//! - Define **failures** and the **error record** delivered when a listener fails
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and no async runtime.
//! The dispatch machinery lives in `fanout-app`.

pub mod error;
pub mod event;
pub mod id;
pub mod listener;
pub mod record;
pub mod time;
