//! The [`Register`] facade: in-memory application state with write-through
//! persistence.
//!
//! All operations run to completion inside the caller's thread; collections
//! are mutated in memory first and the touched documents are written through
//! immediately. In-memory state stays authoritative if a write fails.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::db::{self, DbState};
use crate::errors::{Error, Result};
use crate::models::{HistoryRecord, MenuItem, Order, Table};

// Persisted document keys, one JSON document per key.
pub(crate) const KEY_ORDERS: &str = "orders";
pub(crate) const KEY_HISTORY: &str = "history";
pub(crate) const KEY_MENU_ITEMS: &str = "menuItems";
pub(crate) const KEY_NEXT_ITEM_ID: &str = "nextItemId";
pub(crate) const KEY_CUSTOM_CATEGORIES: &str = "customCategories";
pub(crate) const KEY_TABLES: &str = "tables";

/// Application state for one till: active orders, settled history, the menu
/// catalog with its id counter, custom categories, and the table list.
pub struct Register {
    db: DbState,
    pub(crate) orders: Vec<Order>,
    pub(crate) history: Vec<HistoryRecord>,
    pub(crate) menu_items: Vec<MenuItem>,
    pub(crate) next_item_id: i64,
    pub(crate) custom_categories: Vec<String>,
    tables: Vec<Table>,
}

impl Register {
    /// Open (or create) the store under `data_dir` and load state from it.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let db = db::init(data_dir)?;
        Self::load(db)
    }

    /// Load state from an already-initialized store, seeding defaults for
    /// any document that has never been written.
    pub fn load(db: DbState) -> Result<Self> {
        let orders: Vec<Order> = load_document(&db, KEY_ORDERS)?.unwrap_or_default();
        let history: Vec<HistoryRecord> = load_document(&db, KEY_HISTORY)?.unwrap_or_default();
        let menu_items: Vec<MenuItem> =
            load_document(&db, KEY_MENU_ITEMS)?.unwrap_or_else(default_menu_items);
        let next_item_id: i64 = load_document(&db, KEY_NEXT_ITEM_ID)?.unwrap_or_else(|| {
            menu_items.iter().map(|item| item.id).max().unwrap_or(0) + 1
        });
        let custom_categories: Vec<String> =
            load_document(&db, KEY_CUSTOM_CATEGORIES)?.unwrap_or_default();
        // Tables are static reference data: read if present, never written.
        let tables: Vec<Table> = load_document(&db, KEY_TABLES)?.unwrap_or_else(default_tables);

        info!(
            orders = orders.len(),
            history = history.len(),
            menu_items = menu_items.len(),
            tables = tables.len(),
            "register loaded"
        );

        Ok(Self {
            db,
            orders,
            history,
            menu_items,
            next_item_id,
            custom_categories,
            tables,
        })
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn custom_categories(&self) -> &[String] {
        &self.custom_categories
    }

    pub fn next_item_id(&self) -> i64 {
        self.next_item_id
    }

    pub fn find_order(&self, order_id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn find_table(&self, table_id: i64) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    /// Whether an id is taken anywhere across active orders and history.
    /// Ids are never reused, even after settlement.
    pub(crate) fn order_id_taken(&self, id: i64) -> bool {
        self.orders.iter().any(|o| o.id == id) || self.history.iter().any(|h| h.id == id)
    }

    // -----------------------------------------------------------------------
    // Write-through persistence
    // -----------------------------------------------------------------------

    pub(crate) fn persist_orders(&self) -> Result<()> {
        db::put_document(&self.db, KEY_ORDERS, &serde_json::to_string(&self.orders)?)
    }

    /// Payment writes the shrunk active collection and the grown history in
    /// one transaction so a crash cannot drop an order between the two.
    pub(crate) fn persist_settlement(&self) -> Result<()> {
        db::put_documents(
            &self.db,
            &[
                (KEY_ORDERS, serde_json::to_string(&self.orders)?),
                (KEY_HISTORY, serde_json::to_string(&self.history)?),
            ],
        )
    }

    pub(crate) fn persist_menu(&self) -> Result<()> {
        db::put_documents(
            &self.db,
            &[
                (KEY_MENU_ITEMS, serde_json::to_string(&self.menu_items)?),
                (KEY_NEXT_ITEM_ID, serde_json::to_string(&self.next_item_id)?),
            ],
        )
    }

    pub(crate) fn persist_categories(&self) -> Result<()> {
        db::put_document(
            &self.db,
            KEY_CUSTOM_CATEGORIES,
            &serde_json::to_string(&self.custom_categories)?,
        )
    }

    /// Category rename re-points menu items, so both documents commit
    /// together.
    pub(crate) fn persist_categories_and_menu(&self) -> Result<()> {
        db::put_documents(
            &self.db,
            &[
                (
                    KEY_CUSTOM_CATEGORIES,
                    serde_json::to_string(&self.custom_categories)?,
                ),
                (KEY_MENU_ITEMS, serde_json::to_string(&self.menu_items)?),
            ],
        )
    }

    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self::load(db::open_in_memory()).expect("load in-memory register")
    }
}

fn load_document<T: DeserializeOwned>(db: &DbState, key: &'static str) -> Result<Option<T>> {
    match db::get_document(db, key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| Error::Corrupt { key, source }),
        None => Ok(None),
    }
}

/// Seed catalog for a fresh store.
fn default_menu_items() -> Vec<MenuItem> {
    let seed = [
        (1, "Chicken schnitzel", 150.0, "main"),
        (2, "Beef goulash", 130.0, "main"),
        (3, "Beer", 35.0, "drink"),
        (4, "Cola", 30.0, "drink"),
        (5, "Ice cream", 45.0, "dessert"),
    ];
    seed.into_iter()
        .map(|(id, name, price, category)| MenuItem {
            id,
            name: name.to_string(),
            price,
            category: category.to_string(),
        })
        .collect()
}

fn default_tables() -> Vec<Table> {
    (1..=4)
        .map(|id| Table {
            id,
            name: format!("Table {id}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_register_seeds_defaults() {
        let reg = Register::in_memory();

        assert!(reg.orders().is_empty());
        assert!(reg.history().is_empty());
        assert_eq!(reg.menu_items().len(), 5);
        assert_eq!(reg.next_item_id(), 6);
        assert!(reg.custom_categories().is_empty());
        assert_eq!(reg.tables().len(), 4);
        assert_eq!(reg.tables()[0].name, "Table 1");
    }

    #[test]
    fn state_survives_reopen_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");

        {
            let mut reg = Register::open(dir.path()).expect("open");
            let order = crate::orders::create_order(&mut reg, 1, &[3, 4]).expect("create");
            crate::menu::add_category(&mut reg, "soup").expect("add category");
            assert_eq!(order.total, 65.0);
        }

        let reg = Register::open(dir.path()).expect("reopen");
        assert_eq!(reg.orders().len(), 1);
        assert_eq!(reg.orders()[0].total, 65.0);
        assert_eq!(reg.orders()[0].items.len(), 2);
        assert_eq!(reg.custom_categories(), &["soup".to_string()]);
    }

    #[test]
    fn corrupt_document_is_reported_not_swallowed() {
        let db = db::open_in_memory();
        db::put_document(&db, KEY_ORDERS, "not json").expect("write garbage");

        let err = Register::load(db).err().expect("load must fail");
        match err {
            Error::Corrupt { key, .. } => assert_eq!(key, KEY_ORDERS),
            other => panic!("expected corrupt-document error, got {other:?}"),
        }
    }

    #[test]
    fn missing_counter_is_rebuilt_from_catalog() {
        let db = db::open_in_memory();
        db::put_document(
            &db,
            KEY_MENU_ITEMS,
            r#"[{"id":11,"name":"Soup","price":60.0,"category":"main"}]"#,
        )
        .expect("write items");

        let reg = Register::load(db).expect("load");
        assert_eq!(reg.next_item_id(), 12);
    }
}
