//! # Workspace Module
//!
//! Ties the pieces together the way the application uses them: a store, the
//! price catalog, the saved recipes and the live costing session. Catalog
//! changes are persisted and then reconciled into the session; recipe changes
//! are persisted as a whole list.

use log::{info, warn};
use uuid::Uuid;

use crate::catalog::PriceCatalog;
use crate::errors::ImportError;
use crate::extraction::{IngredientExtractor, ParsedIngredient};
use crate::ledger::LineEdit;
use crate::recipes::{RecipeBook, RecipeNameError};
use crate::session::CostingSession;
use crate::store::{self, KeyValueStore};

pub struct Workspace<S: KeyValueStore> {
    store: S,
    catalog: PriceCatalog,
    recipes: RecipeBook,
    session: CostingSession,
}

impl<S: KeyValueStore> Workspace<S> {
    /// Load catalog and recipes from the store and start a blank table
    pub fn open(store: S) -> Self {
        let catalog = store::load_catalog(&store);
        let recipes = store::load_recipes(&store);
        Self {
            store,
            catalog,
            recipes,
            session: CostingSession::new(),
        }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn session(&self) -> &CostingSession {
        &self.session
    }

    /// Direct access for pricing controls and other catalog-free edits
    pub fn session_mut(&mut self) -> &mut CostingSession {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Change the catalog; when it changed, persist it and re-price the table
    ///
    /// Returns the closure's result along with the ids of re-priced lines.
    pub fn update_catalog<R>(&mut self, change: impl FnOnce(&mut PriceCatalog) -> R) -> (R, Vec<Uuid>) {
        let before = self.catalog.clone();
        let result = change(&mut self.catalog);

        if self.catalog == before {
            return (result, Vec::new());
        }

        store::save_catalog(&mut self.store, &self.catalog);
        let repriced = self.session.catalog_changed(&self.catalog);
        (result, repriced)
    }

    /// Add or re-price a catalog item by name
    pub fn upsert_catalog_item(&mut self, name: &str, price: f64, unit: &str) -> Uuid {
        self.update_catalog(|catalog| catalog.upsert(name, price, unit)).0
    }

    /// Drag a catalog item into the costing table
    pub fn add_catalog_item_to_table(&mut self, item_id: Uuid) -> Option<Uuid> {
        let item = self.catalog.get(item_id)?;
        Some(self.session.add_from_catalog_item(item))
    }

    /// Edit a line of the costing table
    pub fn edit_line(&mut self, id: Uuid, edit: LineEdit) -> bool {
        self.session.apply_edit(id, edit, &self.catalog)
    }

    pub fn import_parsed(&mut self, parsed: &[ParsedIngredient]) -> Result<usize, ImportError> {
        self.session.import_parsed(&self.catalog, parsed)
    }

    pub async fn import_text<E: IngredientExtractor>(
        &mut self,
        extractor: &E,
        recipe_text: &str,
    ) -> Result<usize, ImportError> {
        self.session.import_text(extractor, &self.catalog, recipe_text).await
    }

    /// Save the live table, overwriting the open recipe if there is one
    pub fn save_recipe(&mut self, name: &str) -> Result<Uuid, RecipeNameError> {
        let id = self
            .recipes
            .save(name, self.session.snapshot(), self.session.loaded_recipe())?;
        self.session.mark_saved(id);
        store::save_recipes(&mut self.store, &self.recipes);
        Ok(id)
    }

    /// Open a saved recipe in the costing table
    pub fn load_recipe(&mut self, id: Uuid) -> bool {
        match self.recipes.get(id) {
            Some(recipe) => {
                self.session.load(recipe);
                true
            }
            None => {
                warn!("Saved recipe {} not found", id);
                false
            }
        }
    }

    /// Delete a saved recipe; deleting the open one resets the table
    pub fn delete_recipe(&mut self, id: Uuid) -> bool {
        if !self.recipes.delete(id) {
            return false;
        }
        info!("Deleted recipe {}", id);
        store::save_recipes(&mut self.store, &self.recipes);
        if self.session.loaded_recipe() == Some(id) {
            self.session.reset();
        }
        true
    }
}
