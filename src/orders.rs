//! Order lifecycle: creation, status transitions, and single-level revert.
//!
//! Status updates targeting an unknown order id are no-ops that leave the
//! collection unchanged — callers check existence through the read
//! accessors, not through error control flow.

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::models::{Order, OrderLineItem, OrderStatus};
use crate::register::Register;

/// Create a new order against a table.
///
/// Line items are owned snapshots of the referenced menu items; later menu
/// edits do not reach into existing orders. The total is the sum of the
/// snapshot prices. The order starts out `Pending`.
pub fn create_order(reg: &mut Register, table_id: i64, menu_item_ids: &[i64]) -> Result<Order> {
    if menu_item_ids.is_empty() {
        return Err(Error::EmptyOrder);
    }
    let table = reg
        .find_table(table_id)
        .cloned()
        .ok_or(Error::UnknownTable(table_id))?;

    let mut items = Vec::with_capacity(menu_item_ids.len());
    for id in menu_item_ids {
        let item = reg
            .menu_items()
            .iter()
            .find(|m| m.id == *id)
            .ok_or(Error::UnknownMenuItem(*id))?;
        items.push(OrderLineItem::from(item));
    }
    let total = items.iter().map(|item| item.price).sum();

    let order = Order {
        id: allocate_order_id(reg),
        table_id: table.id,
        table_name: table.name,
        items,
        total,
        status: OrderStatus::Pending,
        timestamp: Utc::now(),
        previous_status: None,
    };

    reg.orders.push(order.clone());
    reg.persist_orders()?;

    info!(
        order_id = order.id,
        table = %order.table_name,
        items = order.items.len(),
        total = order.total,
        "order created"
    );

    Ok(order)
}

/// Millisecond-epoch ids, bumped forward on a same-millisecond collision so
/// uniqueness across active orders and history is enforced, not just likely.
fn allocate_order_id(reg: &Register) -> i64 {
    let mut id = Utc::now().timestamp_millis();
    while reg.order_id_taken(id) {
        id += 1;
    }
    id
}

/// Move an order to `new_status`.
///
/// Unknown ids are a no-op returning `Ok(false)`. A target outside the
/// transition table is rejected before any mutation. `Paid` is never a
/// legal target here — payment processing is the only writer of `Paid`.
/// On success the prior status is recorded for [`revert_status`].
pub fn set_status(reg: &mut Register, order_id: i64, new_status: OrderStatus) -> Result<bool> {
    if new_status == OrderStatus::Paid {
        return Err(Error::PaidOutsidePayment);
    }

    let Some(order) = reg.orders.iter_mut().find(|o| o.id == order_id) else {
        debug!(order_id, "status update for unknown order ignored");
        return Ok(false);
    };

    if !order.status.can_transition_to(new_status) {
        return Err(Error::InvalidTransition {
            from: order.status,
            to: new_status,
        });
    }

    order.previous_status = Some(order.status);
    order.status = new_status;

    reg.persist_orders()?;

    info!(order_id, status = %new_status, "order status updated");
    Ok(true)
}

/// Restore the status recorded by the immediately preceding transition.
///
/// Single-level undo: the recorded status is consumed, so a second revert
/// without an intervening transition is rejected. Unknown ids are a no-op
/// returning `Ok(false)`.
pub fn revert_status(reg: &mut Register, order_id: i64) -> Result<bool> {
    let Some(order) = reg.orders.iter_mut().find(|o| o.id == order_id) else {
        debug!(order_id, "revert for unknown order ignored");
        return Ok(false);
    };

    let Some(previous) = order.previous_status else {
        return Err(Error::NothingToRevert(order_id));
    };

    order.status = previous;
    order.previous_status = None;

    reg.persist_orders()?;

    info!(order_id, status = %previous, "order status reverted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_with_order() -> (Register, i64) {
        let mut reg = Register::in_memory();
        let order = create_order(&mut reg, 1, &[1, 3]).expect("create order");
        (reg, order.id)
    }

    #[test]
    fn create_order_snapshots_menu_items() {
        let mut reg = Register::in_memory();

        let order = create_order(&mut reg, 2, &[2, 3, 3]).expect("create order");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.table_name, "Table 2");
        assert_eq!(order.items.len(), 3);
        assert_eq!(order.total, 130.0 + 35.0 + 35.0);

        // Editing the catalog afterwards must not reach into the order.
        crate::menu::update_menu_item(&mut reg, 2, "Goulash deluxe", 999.0, "main")
            .expect("update item");
        assert_eq!(reg.orders()[0].items[0].name, "Beef goulash");
        assert_eq!(reg.orders()[0].items[0].price, 130.0);
        assert_eq!(reg.orders()[0].total, 200.0);
    }

    #[test]
    fn create_order_rejects_empty_and_unknown() {
        let mut reg = Register::in_memory();

        assert!(matches!(
            create_order(&mut reg, 1, &[]),
            Err(Error::EmptyOrder)
        ));
        assert!(matches!(
            create_order(&mut reg, 99, &[1]),
            Err(Error::UnknownTable(99))
        ));
        assert!(matches!(
            create_order(&mut reg, 1, &[1, 77]),
            Err(Error::UnknownMenuItem(77))
        ));
        assert!(reg.orders().is_empty());
    }

    #[test]
    fn order_ids_are_unique_across_actives() {
        let mut reg = Register::in_memory();
        let a = create_order(&mut reg, 1, &[1]).expect("first");
        let b = create_order(&mut reg, 1, &[1]).expect("second");
        let c = create_order(&mut reg, 2, &[2]).expect("third");

        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn set_status_moves_pending_to_ready() {
        let (mut reg, id) = register_with_order();

        assert!(set_status(&mut reg, id, OrderStatus::Ready).expect("set ready"));
        let order = reg.find_order(id).expect("order");
        assert_eq!(order.status, OrderStatus::Ready);
        assert_eq!(order.previous_status, Some(OrderStatus::Pending));
    }

    #[test]
    fn set_status_only_touches_the_target() {
        let mut reg = Register::in_memory();
        let a = create_order(&mut reg, 1, &[1]).expect("a");
        let b = create_order(&mut reg, 2, &[2]).expect("b");

        set_status(&mut reg, a.id, OrderStatus::Ready).expect("set ready");

        assert_eq!(
            reg.find_order(b.id).expect("b still there").status,
            OrderStatus::Pending
        );
        assert_eq!(reg.orders().len(), 2);
    }

    #[test]
    fn set_status_on_unknown_id_is_a_noop() {
        let (mut reg, id) = register_with_order();

        assert!(!set_status(&mut reg, id + 1, OrderStatus::Ready).expect("noop"));
        assert_eq!(reg.orders().len(), 1);
        assert_eq!(
            reg.find_order(id).expect("order").status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn set_status_rejects_illegal_transitions() {
        let (mut reg, id) = register_with_order();

        assert!(matches!(
            set_status(&mut reg, id, OrderStatus::Pending),
            Err(Error::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Pending
            })
        ));
        assert!(matches!(
            set_status(&mut reg, id, OrderStatus::Paid),
            Err(Error::PaidOutsidePayment)
        ));
        assert_eq!(
            reg.find_order(id).expect("order").status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn revert_restores_exactly_the_previous_status_once() {
        let (mut reg, id) = register_with_order();
        set_status(&mut reg, id, OrderStatus::Ready).expect("set ready");

        assert!(revert_status(&mut reg, id).expect("revert"));
        let order = reg.find_order(id).expect("order");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.previous_status, None);

        // No multi-level undo.
        assert!(matches!(
            revert_status(&mut reg, id),
            Err(Error::NothingToRevert(_))
        ));
    }

    #[test]
    fn revert_on_unknown_id_is_a_noop() {
        let (mut reg, id) = register_with_order();
        assert!(!revert_status(&mut reg, id + 1).expect("noop"));
    }

    #[test]
    fn fresh_order_has_nothing_to_revert() {
        let (mut reg, id) = register_with_order();
        assert!(matches!(
            revert_status(&mut reg, id),
            Err(Error::NothingToRevert(_))
        ));
    }
}
