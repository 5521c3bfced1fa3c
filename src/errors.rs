//! Error taxonomy for the till.
//!
//! Validation rejections are surfaced before any state is mutated; a
//! rejected operation leaves every collection untouched. Storage errors are
//! fatal to the single write that raised them — in-memory state stays
//! authoritative until the next successful write.

use crate::models::OrderStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("order has no items")]
    EmptyOrder,

    #[error("unknown table: {0}")]
    UnknownTable(i64),

    #[error("unknown menu item: {0}")]
    UnknownMenuItem(i64),

    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("orders are marked paid through payment processing")]
    PaidOutsidePayment,

    #[error("order {0} has no previous status to restore")]
    NothingToRevert(i64),

    #[error("no ready orders in the payment selection")]
    EmptySelection,

    #[error("insufficient cash: received {received:.2}, total due {total:.2}")]
    InsufficientCash { total: f64, received: f64 },

    #[error("menu item name must not be empty")]
    BlankName,

    #[error("menu item price must not be negative")]
    NegativePrice,

    #[error("category name must not be empty")]
    BlankCategory,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    #[error("built-in category cannot be changed: {0}")]
    BuiltinCategory(String),

    #[error("category is still used by menu items: {0}")]
    CategoryInUse(String),

    #[error("storage: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode state document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("corrupt state document `{key}`: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
