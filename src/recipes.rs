//! # Saved Recipes Module
//!
//! Named, timestamped snapshots of a costing table. A snapshot owns its own
//! copy of the ingredient lines, so later catalog changes never reach it.

use std::fmt;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::IngredientLine;

/// Longest accepted recipe name, in bytes
pub const MAX_RECIPE_NAME_LEN: usize = 255;

/// Why a recipe name was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeNameError {
    Empty,
    TooLong,
}

impl fmt::Display for RecipeNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeNameError::Empty => write!(f, "recipe name is empty"),
            RecipeNameError::TooLong => {
                write!(f, "recipe name is longer than {MAX_RECIPE_NAME_LEN} characters")
            }
        }
    }
}

impl std::error::Error for RecipeNameError {}

/// Validates a recipe name, returning it trimmed
pub fn validate_recipe_name(name: &str) -> Result<String, RecipeNameError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(RecipeNameError::Empty);
    }

    if trimmed.len() > MAX_RECIPE_NAME_LEN {
        return Err(RecipeNameError::TooLong);
    }

    Ok(trimmed.to_string())
}

/// The live state a snapshot captures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeState {
    pub lines: Vec<IngredientLine>,
    pub selling_price: f64,
    pub yield_count: f64,
}

/// A saved recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecipe {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub state: RecipeState,
    /// Time of the last save
    pub created_at: DateTime<Utc>,
    /// Incremented on every overwrite
    #[serde(default)]
    pub revision: u32,
}

/// The list of saved recipes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeBook {
    recipes: Vec<SavedRecipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_recipes(recipes: Vec<SavedRecipe>) -> Self {
        Self { recipes }
    }

    pub fn recipes(&self) -> &[SavedRecipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&SavedRecipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Saved recipes, most recently saved first
    pub fn list_recent(&self) -> Vec<&SavedRecipe> {
        let mut recipes: Vec<&SavedRecipe> = self.recipes.iter().collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recipes
    }

    /// Save a state under a name
    ///
    /// When `current` names an existing recipe it is overwritten in place,
    /// otherwise a new recipe is added. Returns the id of the saved recipe.
    pub fn save(
        &mut self,
        name: &str,
        state: RecipeState,
        current: Option<Uuid>,
    ) -> Result<Uuid, RecipeNameError> {
        let name = validate_recipe_name(name)?;
        let now = Utc::now();

        if let Some(existing) = current.and_then(|id| self.recipes.iter_mut().find(|r| r.id == id)) {
            existing.name = name;
            existing.state = state;
            existing.created_at = now;
            existing.revision += 1;
            info!("Updated recipe '{}' ({}), revision {}", existing.name, existing.id, existing.revision);
            return Ok(existing.id);
        }

        let recipe = SavedRecipe {
            id: Uuid::new_v4(),
            name,
            state,
            created_at: now,
            revision: 0,
        };
        let id = recipe.id;
        info!("Saved new recipe '{}' ({})", recipe.name, id);
        self.recipes.push(recipe);
        Ok(id)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.recipes.len();
        self.recipes.retain(|recipe| recipe.id != id);
        self.recipes.len() != before
    }
}
