//! # Ingredient Ledger Module
//!
//! Owns the ordered ingredient lines of the recipe being costed and applies
//! edits to them while keeping each line's conversion factor consistent with
//! its purchase unit and recipe unit.
//!
//! ## Core Concepts
//!
//! - **Purchase price / purchase unit**: what was paid, and for how much (80 per kg)
//! - **Recipe unit / quantity**: how much the recipe uses (1000 g)
//! - **Conversion factor**: recipe units in one purchase unit (1000 g per kg)
//! - **Unit cost**: `purchase_price / conversion_factor`
//! - **Extension cost**: `unit_cost * quantity`
//!
//! ## Usage
//!
//! ```rust
//! use food_costing::catalog::PriceCatalog;
//! use food_costing::ledger::{IngredientLedger, LineEdit};
//!
//! let catalog = PriceCatalog::seeded();
//! let mut ledger = IngredientLedger::with_blank_line();
//! let id = ledger.lines()[0].id;
//!
//! ledger.apply_edit(id, LineEdit::SetName("Flour".into()), &catalog);
//! ledger.apply_edit(id, LineEdit::SetQuantity(1000.0), &catalog);
//!
//! assert_eq!(ledger.grand_total(), 80.0);
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogItem, PriceCatalog};
use crate::units::{self, is_piece_unit};

/// Whether a line's conversion factor follows its units or was typed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Recomputed from the purchase unit and recipe unit
    #[default]
    Auto,
    /// Entered by the user; kept until a unit or name change recomputes it
    Manual,
}

/// One ingredient row of the costing table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientLine {
    pub id: Uuid,
    /// Empty name marks a placeholder row
    pub name: String,
    /// Amount used, in `unit`
    pub quantity: f64,
    /// Recipe unit
    pub unit: String,
    /// Price paid per `purchase_unit`
    pub purchase_price: f64,
    pub purchase_unit: String,
    /// Recipe units per purchase unit; 0 means "not costed"
    pub conversion_factor: f64,
    #[serde(default)]
    pub conversion_mode: ConversionMode,
}

impl IngredientLine {
    /// A fresh placeholder row: 1 g of nothing, bought per kg
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            quantity: 1.0,
            unit: "g".to_string(),
            purchase_price: 0.0,
            purchase_unit: "kg".to_string(),
            conversion_factor: 1000.0,
            conversion_mode: ConversionMode::Auto,
        }
    }

    /// A row priced from a catalog item, used once in a piece or gram unit
    pub fn from_catalog_item(item: &CatalogItem) -> Self {
        let unit = if is_piece_unit(&item.unit) { "pc" } else { "g" };
        let mut line = Self {
            id: Uuid::new_v4(),
            name: item.name.clone(),
            quantity: 1.0,
            unit: unit.to_string(),
            purchase_price: item.price,
            purchase_unit: item.unit.clone(),
            conversion_factor: 1.0,
            conversion_mode: ConversionMode::Auto,
        };
        line.recompute_conversion_factor();
        line
    }

    /// Cost of a single recipe unit
    pub fn unit_cost(&self) -> f64 {
        if self.conversion_factor > 0.0 {
            self.purchase_price / self.conversion_factor
        } else {
            0.0
        }
    }

    /// Cost of the quantity used
    pub fn extension_cost(&self) -> f64 {
        self.unit_cost() * self.quantity
    }

    /// An unnamed, unpriced row that a catalog drag-in may overwrite
    pub fn is_placeholder(&self) -> bool {
        self.name.trim().is_empty() && self.purchase_price == 0.0
    }

    /// Whether this row counts towards the grand total
    pub fn is_costed(&self) -> bool {
        !self.name.trim().is_empty()
            && self.quantity > 0.0
            && self.purchase_price > 0.0
            && self.conversion_factor > 0.0
    }

    /// Reset the conversion factor from the current unit pair
    pub fn recompute_conversion_factor(&mut self) {
        if !units::is_resolvable(&self.purchase_unit, &self.unit) {
            warn!(
                "No automatic conversion from '{}' to '{}' for '{}', a manual factor is required",
                self.purchase_unit, self.unit, self.name
            );
        }
        self.conversion_factor = units::resolve(&self.purchase_unit, &self.unit);
        self.conversion_mode = ConversionMode::Auto;
    }

    /// Take price and purchase unit from a catalog item and recompute the
    /// conversion factor, replacing any manual override
    pub fn apply_catalog_item(&mut self, item: &CatalogItem) {
        self.purchase_price = item.price;
        self.purchase_unit = item.unit.clone();
        self.recompute_conversion_factor();
    }

    /// Whether this line already carries the catalog item's price and unit
    pub fn is_priced_by(&self, item: &CatalogItem) -> bool {
        self.purchase_price == item.price && self.purchase_unit == item.unit
    }
}

/// A single typed edit to an ingredient line
#[derive(Debug, Clone, PartialEq)]
pub enum LineEdit {
    /// Rename; a catalog match re-prices the line
    SetName(String),
    SetQuantity(f64),
    /// Change the recipe unit; recomputes the conversion factor
    SetUnit(String),
    SetPurchasePrice(f64),
    /// Change the purchase unit; recomputes the conversion factor
    SetPurchaseUnit(String),
    /// Manual conversion factor; values below 0 are clamped to 0
    SetConversionFactor(f64),
}

fn coerce_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl LineEdit {
    /// Apply this edit to a line in place
    pub fn apply(self, line: &mut IngredientLine, catalog: &PriceCatalog) {
        match self {
            LineEdit::SetName(name) => {
                line.name = name;
                if let Some(item) = catalog.find_by_name(&line.name) {
                    debug!("Name '{}' matches catalog item {}", line.name, item.id);
                    line.purchase_price = item.price;
                    line.purchase_unit = item.unit.clone();
                    line.recompute_conversion_factor();
                }
            }
            LineEdit::SetQuantity(quantity) => line.quantity = coerce_amount(quantity),
            LineEdit::SetUnit(unit) => {
                line.unit = unit;
                line.recompute_conversion_factor();
            }
            LineEdit::SetPurchasePrice(price) => line.purchase_price = coerce_amount(price),
            LineEdit::SetPurchaseUnit(unit) => {
                line.purchase_unit = unit;
                line.recompute_conversion_factor();
            }
            LineEdit::SetConversionFactor(factor) => {
                line.conversion_factor = coerce_amount(factor);
                line.conversion_mode = ConversionMode::Manual;
            }
        }
    }
}

/// Ordered collection of ingredient lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientLedger {
    lines: Vec<IngredientLine>,
}

impl IngredientLedger {
    /// Create a ledger without any lines
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger holding a single blank line
    pub fn with_blank_line() -> Self {
        Self {
            lines: vec![IngredientLine::blank()],
        }
    }

    pub fn from_lines(lines: Vec<IngredientLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[IngredientLine] {
        &self.lines
    }

    pub fn line(&self, id: Uuid) -> Option<&IngredientLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append a blank line and return its id
    pub fn add_blank(&mut self) -> Uuid {
        let line = IngredientLine::blank();
        let id = line.id;
        self.lines.push(line);
        id
    }

    /// Add a line priced from a catalog item
    ///
    /// The first placeholder row is overwritten if there is one, otherwise the
    /// line is appended.
    pub fn add_from_catalog_item(&mut self, item: &CatalogItem) -> Uuid {
        let line = IngredientLine::from_catalog_item(item);
        let id = line.id;

        match self.lines.iter().position(IngredientLine::is_placeholder) {
            Some(index) => {
                debug!("Replacing placeholder row {} with '{}'", index, item.name);
                self.lines[index] = line;
            }
            None => self.lines.push(line),
        }

        info!("Added '{}' from catalog", item.name);
        id
    }

    /// Apply an edit to one line
    ///
    /// Returns `true` when the line exists and its content changed. The edit
    /// is applied to a copy and swapped in whole.
    pub fn apply_edit(&mut self, id: Uuid, edit: LineEdit, catalog: &PriceCatalog) -> bool {
        let Some(line) = self.lines.iter_mut().find(|line| line.id == id) else {
            warn!("Ignoring edit for unknown ingredient line {}", id);
            return false;
        };

        let mut updated = line.clone();
        edit.apply(&mut updated, catalog);

        if updated == *line {
            return false;
        }
        *line = updated;
        true
    }

    /// Delete a line; an empty ledger is valid
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }

    /// Replace all lines with a single blank line
    pub fn reset(&mut self) {
        self.lines = vec![IngredientLine::blank()];
    }

    /// Replace the whole content of the ledger
    pub fn replace_all(&mut self, lines: Vec<IngredientLine>) {
        self.lines = lines;
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [IngredientLine] {
        &mut self.lines
    }

    /// Sum of extension costs over costed lines
    ///
    /// Lines without a name, quantity, price or conversion factor do not count.
    pub fn grand_total(&self) -> f64 {
        self.lines
            .iter()
            .filter(|line| line.is_costed())
            .map(IngredientLine::extension_cost)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flour_line() -> IngredientLine {
        IngredientLine {
            name: "Flour".to_string(),
            quantity: 1000.0,
            purchase_price: 80.0,
            ..IngredientLine::blank()
        }
    }

    #[test]
    fn test_blank_line_defaults() {
        let line = IngredientLine::blank();
        assert_eq!(line.name, "");
        assert_eq!(line.quantity, 1.0);
        assert_eq!(line.unit, "g");
        assert_eq!(line.purchase_price, 0.0);
        assert_eq!(line.purchase_unit, "kg");
        assert_eq!(line.conversion_factor, 1000.0);
        assert_eq!(line.conversion_mode, ConversionMode::Auto);
        assert!(line.is_placeholder());
    }

    #[test]
    fn test_flour_costs() {
        let line = flour_line();
        assert!((line.unit_cost() - 0.08).abs() < 1e-12);
        assert!((line.extension_cost() - 80.0).abs() < 1e-9);

        let ledger = IngredientLedger::from_lines(vec![line]);
        assert!((ledger.grand_total() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_factor_has_no_unit_cost() {
        let line = IngredientLine {
            conversion_factor: 0.0,
            ..flour_line()
        };
        assert_eq!(line.unit_cost(), 0.0);
        assert_eq!(line.extension_cost(), 0.0);
    }

    #[test]
    fn test_grand_total_excludes_incomplete_lines() {
        let ledger = IngredientLedger::from_lines(vec![
            flour_line(),
            IngredientLine { name: String::new(), ..flour_line() },
            IngredientLine { name: "  ".to_string(), ..flour_line() },
            IngredientLine { quantity: 0.0, ..flour_line() },
            IngredientLine { purchase_price: 0.0, ..flour_line() },
            IngredientLine { conversion_factor: 0.0, ..flour_line() },
            IngredientLine { quantity: -5.0, ..flour_line() },
        ]);
        assert!((ledger.grand_total() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_from_catalog_replaces_first_placeholder() {
        let catalog = PriceCatalog::seeded();
        let mut ledger = IngredientLedger::from_lines(vec![
            flour_line(),
            IngredientLine::blank(),
            IngredientLine::blank(),
        ]);
        let first_blank = ledger.lines()[1].id;
        let last_blank = ledger.lines()[2].id;

        let eggs = catalog.find_by_name("Eggs").unwrap();
        let id = ledger.add_from_catalog_item(eggs);

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.lines()[1].id, id);
        assert!(ledger.line(first_blank).is_none());
        assert!(ledger.line(last_blank).is_some());

        let line = ledger.line(id).unwrap();
        assert_eq!(line.unit, "pc");
        assert_eq!(line.purchase_unit, "pc");
        assert_eq!(line.purchase_price, 7.0);
        assert_eq!(line.conversion_factor, 1.0);
        assert_eq!(line.quantity, 1.0);
    }

    #[test]
    fn test_add_from_catalog_appends_without_placeholder() {
        let catalog = PriceCatalog::seeded();
        let mut ledger = IngredientLedger::from_lines(vec![flour_line()]);

        let milk = catalog.find_by_name("Milk").unwrap();
        let id = ledger.add_from_catalog_item(milk);

        assert_eq!(ledger.len(), 2);
        let line = ledger.line(id).unwrap();
        assert_eq!(line.unit, "g");
        assert_eq!(line.purchase_unit, "liter");
        // liter -> g crosses families
        assert_eq!(line.conversion_factor, 1.0);
    }

    #[test]
    fn test_named_blank_is_not_placeholder() {
        let line = IngredientLine {
            name: "Salt".to_string(),
            ..IngredientLine::blank()
        };
        assert!(!line.is_placeholder());
        let priced = IngredientLine {
            purchase_price: 5.0,
            ..IngredientLine::blank()
        };
        assert!(!priced.is_placeholder());
    }

    #[test]
    fn test_unit_edits_recompute_factor() {
        let catalog = PriceCatalog::new();
        let mut ledger = IngredientLedger::with_blank_line();
        let id = ledger.lines()[0].id;

        assert!(ledger.apply_edit(id, LineEdit::SetUnit("kg".into()), &catalog));
        assert_eq!(ledger.line(id).unwrap().conversion_factor, 1.0);

        assert!(ledger.apply_edit(id, LineEdit::SetPurchaseUnit("g".into()), &catalog));
        assert_eq!(ledger.line(id).unwrap().conversion_factor, 0.001);

        assert!(ledger.apply_edit(id, LineEdit::SetPurchaseUnit("liter".into()), &catalog));
        assert_eq!(ledger.line(id).unwrap().conversion_factor, 1.0);
    }

    #[test]
    fn test_manual_override_until_unit_change() {
        let catalog = PriceCatalog::new();
        let mut ledger = IngredientLedger::with_blank_line();
        let id = ledger.lines()[0].id;

        ledger.apply_edit(id, LineEdit::SetConversionFactor(12.0), &catalog);
        let line = ledger.line(id).unwrap();
        assert_eq!(line.conversion_factor, 12.0);
        assert_eq!(line.conversion_mode, ConversionMode::Manual);

        ledger.apply_edit(id, LineEdit::SetQuantity(3.0), &catalog);
        ledger.apply_edit(id, LineEdit::SetPurchasePrice(84.0), &catalog);
        assert_eq!(ledger.line(id).unwrap().conversion_factor, 12.0);

        ledger.apply_edit(id, LineEdit::SetUnit("g".into()), &catalog);
        let line = ledger.line(id).unwrap();
        assert_eq!(line.conversion_factor, 1000.0);
        assert_eq!(line.conversion_mode, ConversionMode::Auto);
    }

    #[test]
    fn test_conversion_factor_clamped() {
        let catalog = PriceCatalog::new();
        let mut ledger = IngredientLedger::with_blank_line();
        let id = ledger.lines()[0].id;

        ledger.apply_edit(id, LineEdit::SetConversionFactor(-4.0), &catalog);
        assert_eq!(ledger.line(id).unwrap().conversion_factor, 0.0);
    }

    #[test]
    fn test_name_edit_prices_from_catalog() {
        let catalog = PriceCatalog::seeded();
        let mut ledger = IngredientLedger::with_blank_line();
        let id = ledger.lines()[0].id;

        ledger.apply_edit(id, LineEdit::SetConversionFactor(5.0), &catalog);
        ledger.apply_edit(id, LineEdit::SetName(" butter ".into()), &catalog);

        let line = ledger.line(id).unwrap();
        assert_eq!(line.name, " butter ");
        assert_eq!(line.purchase_price, 250.0);
        assert_eq!(line.purchase_unit, "kg");
        assert_eq!(line.conversion_factor, 1000.0);
        assert_eq!(line.conversion_mode, ConversionMode::Auto);
    }

    #[test]
    fn test_name_edit_without_match_keeps_pricing() {
        let catalog = PriceCatalog::seeded();
        let mut ledger = IngredientLedger::with_blank_line();
        let id = ledger.lines()[0].id;

        ledger.apply_edit(id, LineEdit::SetPurchasePrice(40.0), &catalog);
        ledger.apply_edit(id, LineEdit::SetConversionFactor(500.0), &catalog);
        ledger.apply_edit(id, LineEdit::SetName("Saffron".into()), &catalog);

        let line = ledger.line(id).unwrap();
        assert_eq!(line.purchase_price, 40.0);
        assert_eq!(line.conversion_factor, 500.0);
        assert_eq!(line.conversion_mode, ConversionMode::Manual);
    }

    #[test]
    fn test_unknown_or_noop_edit_reports_no_change() {
        let catalog = PriceCatalog::new();
        let mut ledger = IngredientLedger::with_blank_line();
        let id = ledger.lines()[0].id;

        assert!(!ledger.apply_edit(Uuid::new_v4(), LineEdit::SetQuantity(2.0), &catalog));
        assert!(!ledger.apply_edit(id, LineEdit::SetQuantity(1.0), &catalog));
        assert!(ledger.apply_edit(id, LineEdit::SetQuantity(f64::NAN), &catalog));
        assert_eq!(ledger.line(id).unwrap().quantity, 0.0);
    }

    #[test]
    fn test_remove_and_reset() {
        let mut ledger = IngredientLedger::from_lines(vec![flour_line()]);
        let id = ledger.lines()[0].id;

        assert!(ledger.remove(id));
        assert!(ledger.is_empty());
        assert!(!ledger.remove(id));
        assert_eq!(ledger.grand_total(), 0.0);

        ledger.add_blank();
        ledger.add_blank();
        ledger.reset();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.lines()[0].is_placeholder());
    }

    #[test]
    fn test_catalog_item_replaces_manual_factor() {
        let mut line = IngredientLine {
            name: "Eggs".to_string(),
            unit: "pc".to_string(),
            purchase_unit: "pc".to_string(),
            purchase_price: 84.0,
            conversion_factor: 12.0,
            conversion_mode: ConversionMode::Manual,
            ..IngredientLine::blank()
        };

        line.apply_catalog_item(&CatalogItem::new("Eggs", 90.0, "pc"));
        assert_eq!(line.purchase_price, 90.0);
        assert_eq!(line.conversion_factor, 1.0);
        assert_eq!(line.conversion_mode, ConversionMode::Auto);
    }
}
