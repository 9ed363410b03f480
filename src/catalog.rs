//! # Price Catalog Module
//!
//! The reference price list ("market list") that ingredient lines are priced
//! against. Items are matched by normalized name; their order only matters for
//! display and drag-reordering.

use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Name given to items created with [`PriceCatalog::add_item`]
pub const NEW_ITEM_NAME: &str = "New Item";

/// A reference price for one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    /// Price paid per `unit`
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    /// Purchase unit the price refers to (e.g. "kg", "pc")
    pub unit: String,
}

impl CatalogItem {
    pub fn new(name: &str, price: f64, unit: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: non_negative(price),
            unit: unit.to_string(),
        }
    }

    /// Check whether this item matches an ingredient name
    pub fn matches(&self, name: &str) -> bool {
        let wanted = normalize_name(name);
        !wanted.is_empty() && normalize_name(&self.name) == wanted
    }
}

/// Normalize an ingredient name for matching (trimmed, lower-case)
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Stored prices go through the same coercion as edited ones
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(non_negative)
}

/// Ordered, user-managed list of reference prices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceCatalog {
    items: Vec<CatalogItem>,
}

impl PriceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from an existing list of items
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// The default catalog used when nothing has been persisted yet
    pub fn seeded() -> Self {
        Self::from_items(vec![
            CatalogItem::new("Flour", 80.0, "kg"),
            CatalogItem::new("Sugar", 90.0, "kg"),
            CatalogItem::new("Eggs", 7.0, "pc"),
            CatalogItem::new("Butter", 250.0, "kg"),
            CatalogItem::new("Milk", 70.0, "liter"),
        ])
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Find the item for an ingredient name (case and whitespace insensitive)
    ///
    /// With duplicate names the first one in display order wins.
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.matches(name))
    }

    /// Autocomplete suggestions for a partially typed ingredient name
    pub fn suggest(&self, query: &str) -> Vec<&CatalogItem> {
        let query = query.to_lowercase();
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Append a placeholder item and return its id
    pub fn add_item(&mut self) -> Uuid {
        self.push(CatalogItem::new(NEW_ITEM_NAME, 0.0, "kg"))
    }

    /// Append an item and return its id
    pub fn push(&mut self, item: CatalogItem) -> Uuid {
        let id = item.id;
        info!("Adding catalog item '{}' ({} / {})", item.name, item.price, item.unit);
        self.items.push(item);
        id
    }

    /// Insert or update the item with this name, returning its id
    pub fn upsert(&mut self, name: &str, price: f64, unit: &str) -> Uuid {
        let existing = self.find_by_name(name).map(|item| item.id);
        match existing {
            Some(id) => {
                self.set_price(id, price);
                self.set_unit(id, unit);
                id
            }
            None => self.push(CatalogItem::new(name, price, unit)),
        }
    }

    pub fn set_name(&mut self, id: Uuid, name: &str) -> bool {
        self.modify(id, |item| {
            if item.name == name {
                return false;
            }
            item.name = name.to_string();
            true
        })
    }

    /// Set the price of an item; negative or non-numeric prices become 0
    pub fn set_price(&mut self, id: Uuid, price: f64) -> bool {
        let price = non_negative(price);
        self.modify(id, |item| {
            if item.price == price {
                return false;
            }
            item.price = price;
            true
        })
    }

    pub fn set_unit(&mut self, id: Uuid, unit: &str) -> bool {
        self.modify(id, |item| {
            if item.unit == unit {
                return false;
            }
            item.unit = unit.to_string();
            true
        })
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            info!("Removed catalog item {}", id);
        }
        removed
    }

    /// Move the item at `from` so that it ends up at index `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        debug!("Moved catalog item from position {} to {}", from, to);
        true
    }

    fn modify(&mut self, id: Uuid, change: impl FnOnce(&mut CatalogItem) -> bool) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => change(item),
            None => {
                debug!("Catalog item {} not found", id);
                false
            }
        }
    }
}
