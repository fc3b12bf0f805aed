//! Menu/catalog shapes consumed from the catalog collaborator
//!
//! The catalog service itself is out of scope; these are the shapes the
//! ledger reads when validating an add and snapshotting the unit price.

use serde::{Deserialize, Serialize};

/// Menu item as supplied by the catalog collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Current catalog price; snapshotted onto lines at add-time
    pub price: f64,
    /// Category used for per-category capacity ceilings
    pub category: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<MenuVariant>,
}

/// A variant (size, preparation) of a menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuVariant {
    pub id: String,
    pub name: String,
    /// Absolute price for this variant (replaces the base price)
    pub price: f64,
}

impl MenuItem {
    /// Resolve the effective price for an optional variant selection
    pub fn price_for(&self, variant_id: Option<&str>) -> Option<f64> {
        match variant_id {
            None => Some(self.price),
            Some(vid) => self.variants.iter().find(|v| v.id == vid).map(|v| v.price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_for_variant() {
        let item = MenuItem {
            id: "noodles".to_string(),
            name: "Noodles".to_string(),
            price: 80.0,
            category: "wok".to_string(),
            variants: vec![MenuVariant {
                id: "large".to_string(),
                name: "Large".to_string(),
                price: 95.0,
            }],
        };
        assert_eq!(item.price_for(None), Some(80.0));
        assert_eq!(item.price_for(Some("large")), Some(95.0));
        assert_eq!(item.price_for(Some("missing")), None);
    }
}
