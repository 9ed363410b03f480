//! # Reconciliation Module
//!
//! Keeps ingredient lines in step with the price catalog. Two entry points:
//!
//! - [`ReconciliationEngine::sync`] re-prices every line whose name matches a
//!   catalog item after the catalog changed
//! - [`ReconciliationEngine::import`] replaces the ledger with lines built
//!   from extracted `{name, quantity, unit}` triples, seeded from the catalog

use log::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::PriceCatalog;
use crate::errors::ImportError;
use crate::extraction::ParsedIngredient;
use crate::ledger::{ConversionMode, IngredientLedger, IngredientLine};
use crate::units::{self, normalize_recipe_unit};

/// Name given to extracted ingredients that came back without one
pub const UNTITLED_INGREDIENT: &str = "Untitled Ingredient";

/// Purchase unit assumed when an imported ingredient is not in the catalog
pub const DEFAULT_PURCHASE_UNIT: &str = "kg";

/// Structural change check used to skip redundant updates
pub fn line_changed(before: &IngredientLine, after: &IngredientLine) -> bool {
    before != after
}

/// Reconciles ledger lines against a price catalog
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine<'a> {
    catalog: &'a PriceCatalog,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(catalog: &'a PriceCatalog) -> Self {
        Self { catalog }
    }

    /// The re-priced version of a line, or `None` if nothing would change
    pub fn reconcile_line(&self, line: &IngredientLine) -> Option<IngredientLine> {
        let item = self.catalog.find_by_name(&line.name)?;
        if line.is_priced_by(item) {
            return None;
        }

        let mut updated = line.clone();
        updated.apply_catalog_item(item);
        line_changed(line, &updated).then_some(updated)
    }

    /// Re-price every matching line, returning the ids of the lines changed
    ///
    /// Quantity, recipe unit and name are never touched. An empty result
    /// means the ledger is already consistent with the catalog.
    pub fn sync(&self, ledger: &mut IngredientLedger) -> Vec<Uuid> {
        let mut changed = Vec::new();

        for line in ledger.lines_mut() {
            if let Some(updated) = self.reconcile_line(line) {
                debug!(
                    "Re-pricing '{}': {} / {} -> {} / {}",
                    line.name,
                    line.purchase_price,
                    line.purchase_unit,
                    updated.purchase_price,
                    updated.purchase_unit
                );
                *line = updated;
                changed.push(line.id);
            }
        }

        if !changed.is_empty() {
            info!("Catalog sync updated {} ingredient line(s)", changed.len());
        }
        changed
    }

    /// Build a ledger line from one extracted ingredient
    pub fn line_from_parsed(&self, parsed: &ParsedIngredient) -> IngredientLine {
        let name = parsed
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNTITLED_INGREDIENT)
            .to_string();

        let quantity = match parsed.quantity {
            Some(quantity) if quantity.is_finite() && quantity > 0.0 => quantity,
            _ => 1.0,
        };

        let unit = normalize_recipe_unit(parsed.unit.as_deref());

        let (purchase_price, purchase_unit) = match self.catalog.find_by_name(&name) {
            Some(item) => (item.price, item.unit.clone()),
            None => (0.0, DEFAULT_PURCHASE_UNIT.to_string()),
        };

        if !units::is_resolvable(&purchase_unit, &unit) {
            warn!(
                "Imported '{}' uses '{}' but is bought per '{}', a manual factor is required",
                name, unit, purchase_unit
            );
        }

        IngredientLine {
            id: Uuid::new_v4(),
            conversion_factor: units::resolve(&purchase_unit, &unit),
            conversion_mode: ConversionMode::Auto,
            name,
            quantity,
            unit,
            purchase_price,
            purchase_unit,
        }
    }

    /// Replace the ledger content with imported ingredients
    ///
    /// An empty list is rejected and leaves the ledger untouched.
    pub fn import(
        &self,
        ledger: &mut IngredientLedger,
        parsed: &[ParsedIngredient],
    ) -> Result<usize, ImportError> {
        if parsed.is_empty() {
            warn!("Extraction returned no ingredients, keeping the current table");
            return Err(ImportError::EmptyResult);
        }

        let lines: Vec<IngredientLine> = parsed.iter().map(|p| self.line_from_parsed(p)).collect();
        let count = lines.len();
        ledger.replace_all(lines);

        info!("Imported {} ingredient line(s)", count);
        Ok(count)
    }
}
