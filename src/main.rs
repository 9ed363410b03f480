use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use uuid::Uuid;

use food_costing::config::AppConfig;
use food_costing::export::{self, format_currency, ExportOptions};
use food_costing::extraction::GeminiExtractor;
use food_costing::localization::LocalizationManager;
use food_costing::pricing::PricingMethod;
use food_costing::store::{KeyValueStore, MemoryStore, SqliteStore};
use food_costing::Workspace;

#[derive(Parser)]
#[command(
    name = "food-costing",
    about = "Recipe cost estimator",
    long_about = "Price recipe ingredients from a catalog, work out cost per serving and selling price, and keep a book of saved recipes"
)]
struct Cli {
    /// Database file override
    #[arg(long, env = "FOOD_COSTING_DB")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the price catalog
    Catalog,

    /// Add or re-price a catalog item
    CatalogSet {
        name: String,
        price: f64,
        unit: String,
    },

    /// Import a recipe text file through the extraction service
    Import {
        file: PathBuf,

        /// Number of servings
        #[arg(long = "yield", default_value_t = 1.0)]
        yield_count: f64,

        /// Price for a target food-cost percentage
        #[arg(long, conflicts_with = "factor")]
        target_percent: Option<f64>,

        /// Price as a multiple of the grand total
        #[arg(long)]
        factor: Option<f64>,

        /// Save the result under this name
        #[arg(long)]
        save: Option<String>,

        /// Write the costing table as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List saved recipes, most recent first
    Recipes,

    /// Delete a saved recipe
    Delete { id: Uuid },

    /// Show a saved recipe
    Show {
        id: Uuid,

        /// Write the costing table as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut config = AppConfig::from_env();
    let cli = Cli::parse();
    if let Some(database) = cli.database.clone() {
        config.database_path = database;
    }

    let l10n = LocalizationManager::new()?;

    info!("Opening food costing database at: {}", config.database_path.display());
    match SqliteStore::open(&config.database_path) {
        Ok(store) => run(cli.command, &config, &l10n, Workspace::open(store)).await,
        Err(e) => {
            error!("Falling back to in-memory storage: {:#}", e);
            eprintln!("{}", l10n.get_message("storage-fallback", None));
            run(cli.command, &config, &l10n, Workspace::open(MemoryStore::new())).await
        }
    }
}

async fn run<S: KeyValueStore>(
    command: Command,
    config: &AppConfig,
    l10n: &LocalizationManager,
    mut workspace: Workspace<S>,
) -> Result<()> {
    let options = ExportOptions {
        currency_symbol: config.currency_symbol.clone(),
    };

    match command {
        Command::Catalog => {
            for item in workspace.catalog().items() {
                println!(
                    "{:<24} {:>12} / {}",
                    item.name,
                    format_currency(item.price, &options.currency_symbol),
                    item.unit
                );
            }
        }
        Command::CatalogSet { name, price, unit } => {
            let (_, repriced) =
                workspace.update_catalog(|catalog| catalog.upsert(&name, price, &unit));
            let price = price.to_string();
            let repriced = repriced.len().to_string();
            println!(
                "{}",
                l10n.get_message_with_args(
                    "catalog-updated",
                    &[
                        ("name", name.as_str()),
                        ("price", price.as_str()),
                        ("unit", unit.as_str()),
                        ("repriced", repriced.as_str()),
                    ],
                )
            );
        }
        Command::Import {
            file,
            yield_count,
            target_percent,
            factor,
            save,
            export,
        } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read recipe from {}", file.display()))?;
            let extractor = GeminiExtractor::new(config.extraction.clone())
                .map_err(|e| anyhow!("Failed to create extraction client: {e}"))?;

            let count = workspace
                .import_text(&extractor, &text)
                .await
                .map_err(|e| anyhow!(l10n.import_error_message(&e)))?;
            let count = count.to_string();
            println!(
                "{}",
                l10n.get_message_with_args("import-success", &[("count", count.as_str())])
            );

            let session = workspace.session_mut();
            session.set_yield(yield_count);
            let skipped = if let Some(factor) = factor {
                session.set_method(PricingMethod::FactorPricing);
                (!session.set_pricing_factor(factor)).then_some("--factor")
            } else if let Some(percent) = target_percent {
                (!session.set_target_percentage(percent)).then_some("--target-percent")
            } else {
                None
            };
            if let Some(control) = skipped {
                warn!("Selling price left unchanged, {} needs a positive grand total", control);
                eprintln!(
                    "{}",
                    l10n.get_message_with_args("pricing-not-applied", &[("control", control)])
                );
            }

            if let Some(name) = save {
                let id = workspace
                    .save_recipe(&name)
                    .map_err(|e| anyhow!(l10n.recipe_name_error_message(&e)))?;
                println!("{} ({id})", l10n.get_message_with_args("recipe-saved", &[("name", name.trim())]));
            }

            print_table(&workspace, &options);
            if let Some(path) = export {
                export_table(&workspace, &options, l10n, &path)?;
            }
        }
        Command::Recipes => {
            let recipes = workspace.recipes().list_recent();
            if recipes.is_empty() {
                println!("{}", l10n.get_message("recipes-empty", None));
            }
            for recipe in recipes {
                println!(
                    "{}  {:<32} {}",
                    recipe.id,
                    recipe.name,
                    recipe.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Delete { id } => {
            let name = workspace.recipes().get(id).map(|recipe| recipe.name.clone());
            match name {
                Some(name) if workspace.delete_recipe(id) => println!(
                    "{}",
                    l10n.get_message_with_args("recipe-deleted", &[("name", name.as_str())])
                ),
                _ => {
                    let id = id.to_string();
                    return Err(anyhow!(
                        l10n.get_message_with_args("recipe-not-found", &[("id", id.as_str())])
                    ));
                }
            }
        }
        Command::Show { id, export } => {
            if !workspace.load_recipe(id) {
                let id = id.to_string();
                return Err(anyhow!(
                    l10n.get_message_with_args("recipe-not-found", &[("id", id.as_str())])
                ));
            }
            if let Some(recipe) = workspace.recipes().get(id) {
                println!(
                    "{}",
                    l10n.get_message_with_args("recipe-loaded", &[("name", recipe.name.as_str())])
                );
            }

            print_table(&workspace, &options);
            if let Some(path) = export {
                export_table(&workspace, &options, l10n, &path)?;
            }
        }
    }

    Ok(())
}

fn print_table<S: KeyValueStore>(workspace: &Workspace<S>, options: &ExportOptions) {
    let symbol = options.currency_symbol.as_str();
    for line in workspace.session().ledger().lines() {
        if line.is_placeholder() {
            continue;
        }
        println!(
            "{:>10} {:<6} {:<24} {:>12}",
            export::format_number(line.quantity, 2),
            line.unit,
            line.name,
            format_currency(line.extension_cost(), symbol)
        );
    }
    println!();
    println!("{}", workspace.session().summary());
}

fn export_table<S: KeyValueStore>(
    workspace: &Workspace<S>,
    options: &ExportOptions,
    l10n: &LocalizationManager,
    path: &Path,
) -> Result<()> {
    let session = workspace.session();
    export::export_to_path(path, session.ledger().lines(), &session.summary(), options)?;
    let shown = path.display().to_string();
    println!("{}", l10n.get_message_with_args("export-done", &[("path", shown.as_str())]));
    Ok(())
}
