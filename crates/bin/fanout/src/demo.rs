//! Demo scenario: a small order pipeline wired onto one emitter.
//!
//! Sample orders cycle through three shapes: a normal order, an order with
//! no items (the inventory listener rejects it) and an oversized order (the
//! fraud listener fails, and the pager error listener cannot route the
//! alert, so that record ends at the unhandled-error hook).

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use fanout_app::{Emitter, ListenerResult, Outcome};
use fanout_domain::event::Event;
use fanout_domain::record::ErrorRecord;

const FRAUD_LIMIT_CENTS: u64 = 100_000;

/// Fired once per accepted order.
pub struct OrderPlaced;

impl Event for OrderPlaced {
    type Args = Order;
    const NAME: &'static str = "order.placed";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u32,
    pub items: u32,
    pub total_cents: u64,
}

/// Counters updated by the demo listeners.
#[derive(Debug, Default)]
pub struct Tally {
    pub placed: Cell<u32>,
    pub revenue_cents: Cell<u64>,
    pub failures: Cell<u32>,
}

/// Deterministic order for the given 1-based round.
#[must_use]
pub fn sample_order(round: u32) -> Order {
    match round % 3 {
        1 => Order {
            id: round,
            items: 2,
            total_cents: 2_500,
        },
        2 => Order {
            id: round,
            items: 0,
            total_cents: 0,
        },
        _ => Order {
            id: round,
            items: 40,
            total_cents: 250_000,
        },
    }
}

async fn reserve_inventory(order: Order) -> ListenerResult {
    tokio::time::sleep(Duration::from_millis(5)).await;
    if order.items == 0 {
        anyhow::bail!("order {} has no items to reserve", order.id);
    }
    tracing::debug!(order = order.id, items = order.items, "inventory reserved");
    Ok(())
}

/// Register the demo listeners and return the shared tally.
pub fn wire(emitter: &Emitter) -> Rc<Tally> {
    let tally = Rc::new(Tally::default());

    let ledger = Rc::clone(&tally);
    emitter.subscribe(OrderPlaced, move |_: &Emitter, order: &Order| {
        ledger.placed.set(ledger.placed.get() + 1);
        ledger
            .revenue_cents
            .set(ledger.revenue_cents.get() + order.total_cents);
    });

    emitter.subscribe_async(OrderPlaced, |_: &Emitter, order: &Order| {
        reserve_inventory(order.clone())
    });

    let fraud = emitter.subscribe(OrderPlaced, |_: &Emitter, order: &Order| {
        if order.total_cents > FRAUD_LIMIT_CENTS {
            anyhow::bail!("order {} exceeds the fraud limit", order.id);
        }
        Ok(())
    });

    let audit = Rc::clone(&tally);
    emitter.subscribe_error(move |_: &Emitter, record: &ErrorRecord| {
        audit.failures.set(audit.failures.get() + 1);
        tracing::warn!(
            listener = %record.listener.id,
            event = record.listener.event,
            reason = %record.reason,
            "listener failed"
        );
    });

    emitter.subscribe_error(move |_: &Emitter, record: &ErrorRecord| {
        if record.listener.id != fraud {
            return Outcome::done();
        }
        Outcome::pending(async {
            tokio::task::yield_now().await;
            Err(anyhow::anyhow!("pager has no route for fraud alerts"))
        })
    });

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn should_cycle_through_three_order_shapes() {
        assert_eq!(sample_order(1).items, 2);
        assert_eq!(sample_order(2).items, 0);
        assert!(sample_order(3).total_cents > FRAUD_LIMIT_CENTS);
        assert_eq!(sample_order(4).items, 2);
    }

    #[tokio::test]
    async fn should_tally_orders_and_contain_failures() {
        let unhandled = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&unhandled);
        let emitter = Emitter::builder()
            .on_unhandled_error(move |record: ErrorRecord| {
                sink.borrow_mut().push(record.reason.to_string());
            })
            .build();
        let tally = wire(&emitter);

        for round in 1..=3 {
            emitter.dispatch(OrderPlaced, sample_order(round)).await;
        }

        assert_eq!(tally.placed.get(), 3);
        assert_eq!(tally.revenue_cents.get(), 252_500);
        assert_eq!(tally.failures.get(), 2);
        assert_eq!(
            *unhandled.borrow(),
            vec!["pager has no route for fraud alerts".to_string()]
        );
    }
}
