//! Payment aggregation: totals over a manual selection of ready orders,
//! cash validation, and the transactional move of settled orders into
//! history.
//!
//! Selection is caller-driven (the presentation layer filters ready orders
//! by table before offering them); ids that are selected but not ready
//! contribute nothing and stay active.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::{Error, Result};
use crate::models::{HistoryRecord, Order, OrderStatus, PaymentMethod};
use crate::register::Register;

/// Result of a successful settlement.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// Amount due over the settled orders.
    pub total: f64,
    /// Change to hand back: `max(0, received - total)` for cash, 0 for card.
    pub change: f64,
    /// The new history entries, in the order they were settled.
    pub records: Vec<HistoryRecord>,
}

fn is_payable(order: &Order, selected_ids: &[i64]) -> bool {
    order.status == OrderStatus::Ready && selected_ids.contains(&order.id)
}

/// Sum of `total` over orders that are both `Ready` and selected.
///
/// A selected id with no ready order behind it contributes nothing,
/// silently.
pub fn compute_total(orders: &[Order], selected_ids: &[i64]) -> f64 {
    orders
        .iter()
        .filter(|o| is_payable(o, selected_ids))
        .map(|o| o.total)
        .sum()
}

/// Partition actives into settled history records and the remainder.
fn settle(
    orders: Vec<Order>,
    selected_ids: &[i64],
    method: PaymentMethod,
    paid_at: DateTime<Utc>,
) -> (Vec<Order>, Vec<HistoryRecord>) {
    let (paid, remaining): (Vec<Order>, Vec<Order>) = orders
        .into_iter()
        .partition(|o| is_payable(o, selected_ids));

    let records = paid
        .into_iter()
        .map(|o| HistoryRecord::from_paid_order(o, method, paid_at))
        .collect();

    (remaining, records)
}

/// Settle the selected ready orders.
///
/// Rejects an empty effective selection and cash tenders below the total;
/// rejection happens before any mutation. On success the settled orders
/// leave the active collection and their history records are appended, both
/// documents committed in a single store transaction. Card tenders are
/// accepted at face value (`amount_received` is ignored, change is 0).
pub fn process_payment(
    reg: &mut Register,
    selected_ids: &[i64],
    method: PaymentMethod,
    amount_received: f64,
) -> Result<PaymentOutcome> {
    if !reg.orders().iter().any(|o| is_payable(o, selected_ids)) {
        return Err(Error::EmptySelection);
    }

    let total = compute_total(reg.orders(), selected_ids);
    if method == PaymentMethod::Cash && amount_received < total {
        return Err(Error::InsufficientCash {
            total,
            received: amount_received,
        });
    }

    let paid_at = Utc::now();
    let actives = std::mem::take(&mut reg.orders);
    let (remaining, records) = settle(actives, selected_ids, method, paid_at);
    reg.orders = remaining;
    reg.history.extend(records.iter().cloned());

    reg.persist_settlement()?;

    let change = match method {
        PaymentMethod::Cash => (amount_received - total).max(0.0),
        PaymentMethod::Card => 0.0,
    };

    info!(
        settled = records.len(),
        total,
        change,
        method = %method,
        "payment processed"
    );

    Ok(PaymentOutcome {
        total,
        change,
        records,
    })
}
