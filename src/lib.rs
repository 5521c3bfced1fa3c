//! Corner Till — a single-location restaurant point-of-sale core.
//!
//! Staff create orders against tables and a menu catalog, move them through
//! a fixed `pending -> ready -> paid` lifecycle, settle them for cash or
//! card, and review the resulting transaction history. All state lives in
//! memory behind the [`Register`] facade and is written through to a local
//! SQLite store on every mutation; a logical operation that touches two
//! collections (payment, category rename) commits them in one transaction.
//!
//! The crate is presentation-agnostic: a UI layer calls the operations in
//! [`orders`], [`payments`], [`menu`] and [`history`] and re-renders from
//! the `Register` read accessors.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod db;
mod errors;
pub mod history;
pub mod menu;
mod models;
pub mod orders;
pub mod payments;
pub mod receipt;
mod register;

pub use errors::{Error, Result};
pub use history::{HistoryFilter, HistoryStats, SortOrder};
pub use models::{
    HistoryRecord, MenuItem, Order, OrderLineItem, OrderStatus, PaymentMethod, Table,
};
pub use payments::PaymentOutcome;
pub use register::Register;

/// Initialize structured logging for embedders that have no subscriber of
/// their own. Honors `RUST_LOG`; defaults to info with debug for this crate.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,corner_till=debug"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full front-of-house flow: order, kitchen signal, settlement, history.
    #[test]
    fn order_to_history_round_trip() {
        let mut reg = Register::in_memory();

        let order = orders::create_order(&mut reg, 3, &[1, 3, 5]).expect("create order");
        assert_eq!(order.total, 150.0 + 35.0 + 45.0);

        orders::set_status(&mut reg, order.id, OrderStatus::Ready).expect("mark ready");

        let outcome =
            payments::process_payment(&mut reg, &[order.id], PaymentMethod::Cash, 250.0)
                .expect("settle");
        assert_eq!(outcome.total, 230.0);
        assert_eq!(outcome.change, 20.0);

        assert!(reg.orders().is_empty());
        let stats = history::aggregate(reg.history());
        assert_eq!(stats.count, 1);
        assert_eq!(stats.revenue, 230.0);
        assert_eq!(stats.total_items_sold, 3);

        let text = receipt::render_receipt(&reg.history()[0]);
        assert!(text.contains("Table: Table 3"));
        assert!(text.contains("230.00"));
    }
}
