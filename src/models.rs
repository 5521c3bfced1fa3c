//! Core record types: menu catalog, tables, active orders, and settled
//! history records.
//!
//! Everything here serializes with camelCase field names and lowercase
//! status/method strings, matching the JSON documents the store keeps
//! (see `register` for the key layout).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sellable item in the menu catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: String,
}

/// Static table reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: i64,
    pub name: String,
}

/// An owned snapshot of a menu item taken at order creation.
///
/// Orders must not change retroactively when the menu is edited, so line
/// items are copies with no reference back to the live catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: String,
}

impl From<&MenuItem> for OrderLineItem {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            category: item.category.clone(),
        }
    }
}

/// Order lifecycle state.
///
/// Transition table: `Pending -> Ready -> Paid`. `Paid` is terminal and is
/// only ever written by payment processing, which also moves the order out
/// of the active collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Ready,
    Paid,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Paid => "paid",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Ready) | (OrderStatus::Ready, OrderStatus::Paid)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }

    /// Human-readable label for receipts.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active order against a table.
///
/// `total` is computed from the line items at creation and never edited
/// independently. `previous_status` is the depth-1 transition history that
/// backs single-level revert; it is absent from serialized documents while
/// empty and cleared when the order settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    pub table_name: String,
    pub items: Vec<OrderLineItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<OrderStatus>,
}

/// A settled order in the append-only history collection.
///
/// Immutable once created; `status` is always [`OrderStatus::Paid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: i64,
    pub table_id: i64,
    pub table_name: String,
    pub items: Vec<OrderLineItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub payment_timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Finalize an order: clone-and-extend with payment metadata, status
    /// rewritten to `Paid`.
    pub fn from_paid_order(order: Order, method: PaymentMethod, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: order.id,
            table_id: order.table_id,
            table_name: order.table_name,
            items: order.items,
            total: order.total,
            status: OrderStatus::Paid,
            timestamp: order.timestamp,
            payment_method: method,
            payment_timestamp: paid_at,
        }
    }
}
