//! Plain-text receipt rendering.
//!
//! Pure formatting over finalized records — no state, no side effects. The
//! output is monospace-aligned text for a narrow receipt printer or a print
//! dialog.

use crate::models::{HistoryRecord, PaymentMethod};
use crate::payments::PaymentOutcome;

const RULE: &str = "--------------------------";
const BANNER: &str = "==========================";

/// Short human-facing transaction reference: the last four digits of the
/// time-based order id.
fn short_ref(id: i64) -> String {
    format!("{:04}", id.rem_euclid(10_000))
}

fn item_line(name: &str, price: f64) -> String {
    format!("{name:<18} {price:>7.2}\n")
}

/// Render a single settled transaction.
pub fn render_receipt(record: &HistoryRecord) -> String {
    let mut out = String::new();

    out.push_str(BANNER);
    out.push('\n');
    out.push_str("===     RESTAURANT     ===\n");
    out.push_str(BANNER);
    out.push_str("\n\n");

    out.push_str(&format!("Transaction #{}\n", short_ref(record.id)));
    out.push_str(&format!(
        "Date: {}\n\n",
        record.payment_timestamp.format("%Y-%m-%d %H:%M")
    ));
    out.push_str(&format!("Table: {}\n", record.table_name));
    out.push_str(&format!("Order number: {}\n\n", record.id));

    out.push_str(RULE);
    out.push_str("\n\nItems:\n\n");
    for item in &record.items {
        out.push_str(&item_line(&item.name, item.price));
    }
    out.push('\n');
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&item_line("Total:", record.total));
    out.push_str(&format!("Paid by: {}\n\n", record.payment_method.label()));

    out.push_str(BANNER);
    out.push_str("\n\nThank you for your visit!\n");

    out
}

/// Render a settlement summary covering every order paid in one go,
/// including the tendered amount and change for cash.
pub fn render_payment_summary(
    outcome: &PaymentOutcome,
    method: PaymentMethod,
    amount_received: f64,
) -> String {
    let mut out = String::new();

    out.push_str(BANNER);
    out.push('\n');
    out.push_str("===     RESTAURANT     ===\n");
    out.push_str(BANNER);
    out.push('\n');

    if let Some(first) = outcome.records.first() {
        out.push_str(&format!(
            "Date: {}\n",
            first.payment_timestamp.format("%Y-%m-%d %H:%M")
        ));
    }
    out.push_str(RULE);
    out.push('\n');

    for record in &outcome.records {
        out.push_str(&format!("Order #{}\n", short_ref(record.id)));
        for item in &record.items {
            out.push_str(&item_line(&item.name, item.price));
        }
        out.push_str(&item_line("Total:", record.total));
        out.push_str(RULE);
        out.push('\n');
    }

    out.push_str(&item_line("Amount due:", outcome.total));
    out.push_str(&format!("Paid by: {}\n", method.label()));
    if method == PaymentMethod::Cash {
        out.push_str(&item_line("Received:", amount_received));
        out.push_str(&item_line("Change:", outcome.change));
    }

    out.push_str(BANNER);
    out.push_str("\nThank you for your visit!\n");

    out
}
