//! Catalog collaborator interface
//!
//! The menu/catalog service is an external collaborator; the ledger only
//! needs enough of it to validate an add and snapshot the unit price.
//! `StaticCatalog` is the in-process implementation used by tests and
//! single-node deployments seeded from configuration.

use parking_lot::RwLock;
use shared::models::MenuItem;
use std::collections::HashMap;
use std::sync::Arc;

/// Read access to the menu catalog
pub trait Catalog: Send + Sync {
    /// Look up a menu item by id
    fn get_item(&self, menu_item_id: &str) -> Option<MenuItem>;
}

/// In-process catalog backed by a mutable map
#[derive(Default)]
pub struct StaticCatalog {
    items: RwLock<HashMap<String, MenuItem>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a menu item
    pub fn upsert(&self, item: MenuItem) {
        self.items.write().insert(item.id.clone(), item);
    }

    /// Change the catalog price of an item (later adds see the new price;
    /// already-stored lines keep their snapshot)
    pub fn set_price(&self, menu_item_id: &str, price: f64) {
        if let Some(item) = self.items.write().get_mut(menu_item_id) {
            item.price = price;
        }
    }
}

impl Catalog for StaticCatalog {
    fn get_item(&self, menu_item_id: &str) -> Option<MenuItem> {
        self.items.read().get(menu_item_id).cloned()
    }
}

/// Shared catalog handle
pub type CatalogRef = Arc<dyn Catalog>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_lookup() {
        let catalog = StaticCatalog::new();
        catalog.upsert(MenuItem {
            id: "noodles".to_string(),
            name: "Noodles".to_string(),
            price: 80.0,
            category: "wok".to_string(),
            variants: vec![],
        });

        assert_eq!(catalog.get_item("noodles").unwrap().price, 80.0);
        assert!(catalog.get_item("missing").is_none());

        catalog.set_price("noodles", 95.0);
        assert_eq!(catalog.get_item("noodles").unwrap().price, 95.0);
    }
}
