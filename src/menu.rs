//! Menu catalog management: item CRUD with a monotonic id counter, and the
//! custom-category set kept alongside the fixed built-ins.
//!
//! Existing orders hold owned snapshots of menu items, so nothing here
//! reaches into the active or history collections — except category rename,
//! which re-points catalog items only.

use tracing::info;

use crate::errors::{Error, Result};
use crate::models::MenuItem;
use crate::register::Register;

/// Fixed built-in categories, in display order.
pub const BUILTIN_CATEGORIES: [&str; 3] = ["main", "drink", "dessert"];

fn is_builtin(name: &str) -> bool {
    BUILTIN_CATEGORIES.contains(&name)
}

fn is_known_category(reg: &Register, name: &str) -> bool {
    is_builtin(name) || reg.custom_categories().iter().any(|c| c == name)
}

fn validate_item_fields(reg: &Register, name: &str, price: f64, category: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::BlankName);
    }
    if price < 0.0 {
        return Err(Error::NegativePrice);
    }
    if !is_known_category(reg, category) {
        return Err(Error::UnknownCategory(category.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Menu items
// ---------------------------------------------------------------------------

/// Add a catalog item. Ids come from the monotonic counter and are never
/// reused, even after deletion.
pub fn add_menu_item(reg: &mut Register, name: &str, price: f64, category: &str) -> Result<MenuItem> {
    validate_item_fields(reg, name, price, category)?;

    let item = MenuItem {
        id: reg.next_item_id,
        name: name.trim().to_string(),
        price,
        category: category.to_string(),
    };
    reg.menu_items.push(item.clone());
    reg.next_item_id += 1;

    reg.persist_menu()?;

    info!(item_id = item.id, name = %item.name, price = item.price, "menu item added");
    Ok(item)
}

/// Edit an existing catalog item in place.
pub fn update_menu_item(
    reg: &mut Register,
    item_id: i64,
    name: &str,
    price: f64,
    category: &str,
) -> Result<()> {
    validate_item_fields(reg, name, price, category)?;

    let item = reg
        .menu_items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or(Error::UnknownMenuItem(item_id))?;
    item.name = name.trim().to_string();
    item.price = price;
    item.category = category.to_string();

    reg.persist_menu()?;

    info!(item_id, "menu item updated");
    Ok(())
}

/// Remove a catalog item. `Ok(false)` when the id is absent. The id counter
/// never rewinds.
pub fn delete_menu_item(reg: &mut Register, item_id: i64) -> Result<bool> {
    let before = reg.menu_items.len();
    reg.menu_items.retain(|i| i.id != item_id);
    if reg.menu_items.len() == before {
        return Ok(false);
    }

    reg.persist_menu()?;

    info!(item_id, "menu item deleted");
    Ok(true)
}

/// Catalog grouped by category: built-ins first in fixed order, then custom
/// categories in insertion order. Empty categories are omitted.
pub fn menu_by_category(reg: &Register) -> Vec<(String, Vec<MenuItem>)> {
    BUILTIN_CATEGORIES
        .iter()
        .map(|c| c.to_string())
        .chain(reg.custom_categories().iter().cloned())
        .filter_map(|category| {
            let items: Vec<MenuItem> = reg
                .menu_items()
                .iter()
                .filter(|i| i.category == category)
                .cloned()
                .collect();
            if items.is_empty() {
                None
            } else {
                Some((category, items))
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Custom categories
// ---------------------------------------------------------------------------

/// Add a custom category. Rejects blanks and duplicates of either a
/// built-in or an existing custom category.
pub fn add_category(reg: &mut Register, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::BlankCategory);
    }
    if is_known_category(reg, name) {
        return Err(Error::DuplicateCategory(name.to_string()));
    }

    reg.custom_categories.push(name.to_string());
    reg.persist_categories()?;

    info!(category = %name, "custom category added");
    Ok(())
}

/// Rename a custom category, re-pointing every catalog item that uses it.
/// Both documents commit together. Built-ins cannot be renamed.
pub fn rename_category(reg: &mut Register, old: &str, new: &str) -> Result<()> {
    if is_builtin(old) {
        return Err(Error::BuiltinCategory(old.to_string()));
    }
    let new = new.trim();
    if new.is_empty() {
        return Err(Error::BlankCategory);
    }
    if new == old {
        return Ok(());
    }
    if is_known_category(reg, new) {
        return Err(Error::DuplicateCategory(new.to_string()));
    }

    let slot = reg
        .custom_categories
        .iter_mut()
        .find(|c| c.as_str() == old)
        .ok_or_else(|| Error::UnknownCategory(old.to_string()))?;
    *slot = new.to_string();

    for item in reg.menu_items.iter_mut().filter(|i| i.category == old) {
        item.category = new.to_string();
    }

    reg.persist_categories_and_menu()?;

    info!(old = %old, new = %new, "custom category renamed");
    Ok(())
}

/// Delete a custom category. Rejected while any catalog item references it.
pub fn delete_category(reg: &mut Register, name: &str) -> Result<()> {
    if is_builtin(name) {
        return Err(Error::BuiltinCategory(name.to_string()));
    }
    if !reg.custom_categories.iter().any(|c| c == name) {
        return Err(Error::UnknownCategory(name.to_string()));
    }
    if reg.menu_items.iter().any(|i| i.category == name) {
        return Err(Error::CategoryInUse(name.to_string()));
    }

    reg.custom_categories.retain(|c| c != name);
    reg.persist_categories()?;

    info!(category = %name, "custom category deleted");
    Ok(())
}
