//! # Workspace Tests
//!
//! Recipe import through a scripted extractor, saved recipes, persistence in
//! SQLite and the user-facing messages for each outcome.

use anyhow::Result;
use food_costing::errors::{ExtractionError, ImportError};
use food_costing::export::{write_csv, ExportOptions};
use food_costing::extraction::{IngredientExtractor, ParsedIngredient};
use food_costing::localization::LocalizationManager;
use food_costing::store::{MemoryStore, SqliteStore};
use food_costing::Workspace;
use tempfile::NamedTempFile;

/// Extractor returning a fixed answer
struct ScriptedExtractor {
    response: Result<Vec<ParsedIngredient>, ExtractionError>,
}

impl ScriptedExtractor {
    fn returning(ingredients: Vec<ParsedIngredient>) -> Self {
        Self {
            response: Ok(ingredients),
        }
    }

    fn failing(err: ExtractionError) -> Self {
        Self { response: Err(err) }
    }
}

impl IngredientExtractor for ScriptedExtractor {
    async fn extract(&self, _recipe_text: &str) -> Result<Vec<ParsedIngredient>, ExtractionError> {
        self.response.clone()
    }
}

fn cake() -> Vec<ParsedIngredient> {
    vec![
        ParsedIngredient::new("flour", 500.0, "g"),
        ParsedIngredient::new("Eggs", 3.0, "pieces"),
        ParsedIngredient::new("vanilla", 5.0, "ml"),
        ParsedIngredient::default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_prices_known_ingredients() {
        let mut workspace = Workspace::open(MemoryStore::new());
        let extractor = ScriptedExtractor::returning(cake());

        let count = workspace.import_text(&extractor, "a cake").await.unwrap();
        assert_eq!(count, 4);

        let lines = workspace.session().ledger().lines();
        assert_eq!(lines[0].purchase_price, 80.0);
        assert_eq!(lines[0].conversion_factor, 1000.0);
        assert_eq!(lines[1].unit, "pc");
        assert_eq!(lines[1].purchase_price, 7.0);
        assert_eq!(lines[2].purchase_price, 0.0);
        assert_eq!(lines[3].name, "Untitled Ingredient");
        assert_eq!(lines[3].quantity, 1.0);

        // 500 g flour at 80/kg plus 3 eggs at 7/pc
        assert!((workspace.session().grand_total() - 61.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_blank_text_never_reaches_extractor() {
        let mut workspace = Workspace::open(MemoryStore::new());
        let extractor = ScriptedExtractor::returning(cake());

        let result = workspace.import_text(&extractor, "   \n").await;
        assert_eq!(result, Err(ImportError::EmptyText));
        assert_eq!(workspace.session().ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_extraction_keeps_table() {
        let mut workspace = Workspace::open(MemoryStore::new());
        workspace.session_mut().set_selling_price(120.0);
        let before = workspace.session().clone();

        let extractor = ScriptedExtractor::failing(ExtractionError::Transport("HTTP 503".into()));
        let err = workspace.import_text(&extractor, "a cake").await.unwrap_err();

        assert_eq!(workspace.session(), &before);
        let l10n = LocalizationManager::new().unwrap();
        assert_eq!(
            l10n.import_error_message(&err),
            "Failed to parse recipe. Transport error: HTTP 503"
        );
    }

    #[tokio::test]
    async fn test_saved_recipe_survives_reopen() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let recipe_id = {
            let mut workspace = Workspace::open(SqliteStore::open(temp_file.path())?);
            let extractor = ScriptedExtractor::returning(cake());
            workspace.import_text(&extractor, "a cake").await?;
            workspace.session_mut().set_yield(8.0);
            workspace.session_mut().set_target_percentage(40.0);
            workspace.upsert_catalog_item("Vanilla", 1200.0, "liter");
            workspace.save_recipe("  Sponge cake ")?
        };

        let mut workspace = Workspace::open(SqliteStore::open(temp_file.path())?);
        assert_eq!(workspace.catalog().len(), 6);
        assert_eq!(workspace.recipes().len(), 1);
        assert_eq!(workspace.recipes().get(recipe_id).unwrap().name, "Sponge cake");

        assert!(workspace.load_recipe(recipe_id));
        let session = workspace.session();
        assert_eq!(session.ledger().len(), 4);
        assert_eq!(session.pricing().yield_count(), 8.0);
        // Vanilla was priced into the table before saving
        assert_eq!(session.ledger().lines()[2].purchase_price, 1200.0);
        Ok(())
    }

    fn open_saved_shortbread(workspace: &mut Workspace<MemoryStore>) -> uuid::Uuid {
        workspace
            .import_parsed(&[ParsedIngredient::new("Butter", 250.0, "g")])
            .unwrap();
        let id = workspace.save_recipe("Shortbread").unwrap();
        assert!(workspace.load_recipe(id));

        let (_, repriced) = workspace.update_catalog(|catalog| catalog.upsert("Butter", 300.0, "kg"));
        assert!(repriced.is_empty());
        assert_eq!(workspace.session().ledger().lines()[0].purchase_price, 250.0);
        id
    }

    #[test]
    fn test_catalog_sync_resumes_after_reset() {
        let mut workspace = Workspace::open(MemoryStore::new());
        open_saved_shortbread(&mut workspace);

        workspace.session_mut().reset();
        let butter = workspace.catalog().find_by_name("Butter").unwrap().id;
        let line = workspace.add_catalog_item_to_table(butter).unwrap();
        assert_eq!(workspace.session().ledger().line(line).unwrap().purchase_price, 300.0);

        let (_, repriced) = workspace.update_catalog(|catalog| catalog.set_price(butter, 320.0));
        assert_eq!(repriced, vec![line]);
        assert_eq!(workspace.session().ledger().line(line).unwrap().purchase_price, 320.0);
    }

    #[test]
    fn test_catalog_sync_resumes_after_import() {
        let mut workspace = Workspace::open(MemoryStore::new());
        let recipe = open_saved_shortbread(&mut workspace);

        workspace
            .import_parsed(&[ParsedIngredient::new("butter", 100.0, "g")])
            .unwrap();
        assert!(workspace.session().is_attached());
        let line = workspace.session().ledger().lines()[0].id;

        let (_, repriced) = workspace.update_catalog(|catalog| catalog.upsert("Butter", 320.0, "kg"));
        assert_eq!(repriced, vec![line]);
        assert_eq!(workspace.session().ledger().line(line).unwrap().purchase_price, 320.0);

        // The saved recipe keeps the price it was saved with
        let saved = workspace.recipes().get(recipe).unwrap();
        assert_eq!(saved.state.lines[0].purchase_price, 250.0);
    }

    #[test]
    fn test_delete_recipe_message() {
        let mut workspace = Workspace::open(MemoryStore::new());
        let id = open_saved_shortbread(&mut workspace);

        assert!(workspace.delete_recipe(id));
        assert!(workspace.recipes().is_empty());
        assert!(workspace.session().is_attached());

        let l10n = LocalizationManager::new().unwrap();
        assert_eq!(
            l10n.get_message_with_args("recipe-deleted", &[("name", "Shortbread")]),
            "Deleted recipe \"Shortbread\"."
        );
    }

    #[test]
    fn test_invalid_recipe_name() {
        let mut workspace = Workspace::open(MemoryStore::new());
        let err = workspace.save_recipe("   ").unwrap_err();
        let l10n = LocalizationManager::new().unwrap();
        assert_eq!(
            l10n.recipe_name_error_message(&err),
            "Please enter a name for this recipe."
        );
        assert!(workspace.recipes().is_empty());
        assert!(workspace.session().is_attached());
    }

    #[test]
    fn test_export_of_imported_table() -> Result<()> {
        let mut workspace = Workspace::open(MemoryStore::new());
        workspace
            .import_parsed(&[ParsedIngredient::new("Flour", 1000.0, "g")])
            .unwrap();
        workspace.session_mut().set_yield(8.0);
        workspace.session_mut().set_target_percentage(40.0);

        let session = workspace.session();
        let mut buffer = Vec::new();
        let options = ExportOptions {
            currency_symbol: "$".to_string(),
        };
        write_csv(&mut buffer, session.ledger().lines(), &session.summary(), &options)?;
        let text = String::from_utf8(buffer)?;

        assert!(text.contains("\"1,000.00\",g,Flour,$80.00 / kg,\"1,000\",$0.0800,$80.00"));
        assert!(text.contains("Recipe Selling Price:,$200.00"));
        assert!(text.contains("Final Food Cost %:,40.00%"));
        Ok(())
    }
}
