//! # Costing Session Module
//!
//! The live costing table: ingredient ledger, pricing controls and the id of
//! the saved recipe currently open, if any.
//!
//! Catalog changes re-price the table only while it is *attached*, that is
//! while no saved recipe is open, so a historical recipe never drifts with
//! the catalog. The table detaches when a recipe is loaded or saved, and
//! re-attaches on [`CostingSession::reset`] or after a successful import.

use log::{debug, info};
use uuid::Uuid;

use crate::catalog::{CatalogItem, PriceCatalog};
use crate::errors::ImportError;
use crate::extraction::{IngredientExtractor, ParsedIngredient};
use crate::ledger::{IngredientLedger, LineEdit};
use crate::pricing::{CostSummary, Pricing, PricingMethod};
use crate::reconcile::ReconciliationEngine;
use crate::recipes::{RecipeState, SavedRecipe};

#[derive(Debug, Clone, PartialEq)]
pub struct CostingSession {
    ledger: IngredientLedger,
    pricing: Pricing,
    loaded_recipe: Option<Uuid>,
}

impl Default for CostingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CostingSession {
    /// A fresh table with one blank line
    pub fn new() -> Self {
        Self {
            ledger: IngredientLedger::with_blank_line(),
            pricing: Pricing::default(),
            loaded_recipe: None,
        }
    }

    pub fn ledger(&self) -> &IngredientLedger {
        &self.ledger
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Id of the saved recipe this table was loaded from or saved as
    pub fn loaded_recipe(&self) -> Option<Uuid> {
        self.loaded_recipe
    }

    /// Whether catalog changes re-price this table
    pub fn is_attached(&self) -> bool {
        self.loaded_recipe.is_none()
    }

    pub fn grand_total(&self) -> f64 {
        self.ledger.grand_total()
    }

    pub fn summary(&self) -> CostSummary {
        self.pricing.summarize(self.grand_total())
    }

    pub fn add_blank(&mut self) -> Uuid {
        self.ledger.add_blank()
    }

    pub fn add_from_catalog_item(&mut self, item: &CatalogItem) -> Uuid {
        self.ledger.add_from_catalog_item(item)
    }

    pub fn apply_edit(&mut self, id: Uuid, edit: LineEdit, catalog: &PriceCatalog) -> bool {
        self.ledger.apply_edit(id, edit, catalog)
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        self.ledger.remove(id)
    }

    pub fn set_selling_price(&mut self, price: f64) {
        self.pricing.set_selling_price(price);
    }

    pub fn set_yield(&mut self, yield_count: f64) {
        self.pricing.set_yield(yield_count);
    }

    pub fn set_method(&mut self, method: PricingMethod) {
        self.pricing.set_method(method);
    }

    pub fn set_target_percentage(&mut self, percentage: f64) -> bool {
        let total = self.grand_total();
        self.pricing.set_from_target_percentage(percentage, total)
    }

    pub fn set_pricing_factor(&mut self, factor: f64) -> bool {
        let total = self.grand_total();
        self.pricing.set_from_pricing_factor(factor, total)
    }

    /// Start over: one blank line, no price, yield 1, attached to the catalog
    pub fn reset(&mut self) {
        info!("Resetting costing table");
        self.ledger.reset();
        self.pricing = Pricing::default();
        self.loaded_recipe = None;
    }

    /// React to a catalog change; returns the ids of re-priced lines
    pub fn catalog_changed(&mut self, catalog: &PriceCatalog) -> Vec<Uuid> {
        if !self.is_attached() {
            debug!("Costing table shows a saved recipe, skipping catalog sync");
            return Vec::new();
        }
        ReconciliationEngine::new(catalog).sync(&mut self.ledger)
    }

    /// Replace the table with extracted ingredients
    ///
    /// On success the table is a new, unsaved recipe. On error nothing changes.
    pub fn import_parsed(
        &mut self,
        catalog: &PriceCatalog,
        parsed: &[ParsedIngredient],
    ) -> Result<usize, ImportError> {
        let count = ReconciliationEngine::new(catalog).import(&mut self.ledger, parsed)?;
        self.loaded_recipe = None;
        Ok(count)
    }

    /// Run free recipe text through an extractor and import the result
    pub async fn import_text<E: IngredientExtractor>(
        &mut self,
        extractor: &E,
        catalog: &PriceCatalog,
        recipe_text: &str,
    ) -> Result<usize, ImportError> {
        if recipe_text.trim().is_empty() {
            return Err(ImportError::EmptyText);
        }
        let parsed = extractor.extract(recipe_text).await?;
        self.import_parsed(catalog, &parsed)
    }

    /// Copy of the live state for saving
    pub fn snapshot(&self) -> RecipeState {
        RecipeState {
            lines: self.ledger.lines().to_vec(),
            selling_price: self.pricing.selling_price(),
            yield_count: self.pricing.yield_count(),
        }
    }

    /// Replace the live state with a saved recipe and detach from the catalog
    pub fn load(&mut self, recipe: &SavedRecipe) {
        info!("Loading recipe '{}' ({})", recipe.name, recipe.id);
        self.ledger = IngredientLedger::from_lines(recipe.state.lines.clone());
        let method = self.pricing.method();
        self.pricing = Pricing::new(recipe.state.selling_price, recipe.state.yield_count);
        self.pricing.set_method(method);
        self.loaded_recipe = Some(recipe.id);
    }

    /// Record that the live table was saved as `id`
    pub fn mark_saved(&mut self, id: Uuid) {
        self.loaded_recipe = Some(id);
    }
}
