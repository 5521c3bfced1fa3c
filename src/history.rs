//! Read-only filtering, sorting, and aggregation over settled transactions.
//!
//! Pure functions of `(records, filters)` — nothing here mutates the
//! history collection.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{HistoryRecord, PaymentMethod};

/// Filter criteria. An omitted date bound is unbounded on that side; an
/// omitted method means "all".
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Aggregate statistics over a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistoryStats {
    pub revenue: f64,
    pub count: usize,
    pub average_transaction: f64,
    pub total_items_sold: usize,
}

/// Keep records whose payment timestamp falls within
/// `[date_from 00:00:00, date_to 23:59:59]` and whose method matches the
/// filter when one is set.
pub fn filter(records: &[HistoryRecord], criteria: &HistoryFilter) -> Vec<HistoryRecord> {
    let mut result: Vec<HistoryRecord> = records.to_vec();

    if let Some(from) = criteria.date_from {
        let start = from.and_time(NaiveTime::MIN).and_utc();
        result.retain(|r| r.payment_timestamp >= start);
    }
    if let Some(to) = criteria.date_to {
        if let Some(end) = to.and_hms_opt(23, 59, 59) {
            let end = end.and_utc();
            result.retain(|r| r.payment_timestamp <= end);
        }
    }
    if let Some(method) = criteria.method {
        result.retain(|r| r.payment_method == method);
    }

    result
}

/// Stable sort by payment timestamp.
pub fn sort_by_date(records: &mut [HistoryRecord], order: SortOrder) {
    match order {
        SortOrder::Ascending => {
            records.sort_by(|a, b| a.payment_timestamp.cmp(&b.payment_timestamp))
        }
        SortOrder::Descending => {
            records.sort_by(|a, b| b.payment_timestamp.cmp(&a.payment_timestamp))
        }
    }
}

/// Filter then sort in one step.
pub fn query(
    records: &[HistoryRecord],
    criteria: &HistoryFilter,
    order: SortOrder,
) -> Vec<HistoryRecord> {
    let mut result = filter(records, criteria);
    sort_by_date(&mut result, order);
    result
}

/// Revenue, count, average transaction value, and items sold.
///
/// The average is defined as 0 over an empty set — the division is guarded,
/// never NaN.
pub fn aggregate(records: &[HistoryRecord]) -> HistoryStats {
    let revenue: f64 = records.iter().map(|r| r.total).sum();
    let count = records.len();
    let average_transaction = if count > 0 { revenue / count as f64 } else { 0.0 };
    let total_items_sold = records.iter().map(|r| r.items.len()).sum();

    HistoryStats {
        revenue,
        count,
        average_transaction,
        total_items_sold,
    }
}
