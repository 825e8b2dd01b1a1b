//! # fanout: demo composition root
//!
//! Wires an emitter together and drives a small scenario through it.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the emitter with the configured unhandled-error hook
//! - Register the demo listeners and dispatch the configured rounds
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no dispatch logic belongs here.

mod config;
mod demo;

use fanout_app::Emitter;
use fanout_app::hook::ignore_unhandled;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, UnhandledPolicy};
use crate::demo::OrderPlaced;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    let emitter = build_emitter(config.emitter.unhandled);
    let tally = demo::wire(&emitter);
    tracing::info!(
        listeners = emitter.listener_count::<OrderPlaced>(),
        error_listeners = emitter.error_listener_count(),
        rounds = config.demo.rounds,
        "emitter wired"
    );

    for round in 1..=config.demo.rounds {
        emitter
            .dispatch(OrderPlaced, demo::sample_order(round))
            .await;
    }

    tracing::info!(
        placed = tally.placed.get(),
        revenue_cents = tally.revenue_cents.get(),
        failures = tally.failures.get(),
        "demo finished"
    );
    Ok(())
}

fn build_emitter(policy: UnhandledPolicy) -> Emitter {
    match policy {
        UnhandledPolicy::Log => Emitter::new(),
        UnhandledPolicy::Ignore => Emitter::builder()
            .on_unhandled_error(ignore_unhandled)
            .build(),
    }
}
