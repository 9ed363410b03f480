//! # Storage Module
//!
//! A small get/set key-value interface for persisting the price catalog and
//! the saved recipes, with a SQLite implementation and an in-memory one.
//!
//! Both lists are written whole on every change. Reading falls back to
//! defaults (seed catalog, empty recipe list) when the stored data is missing
//! or unreadable, so a broken store never stops the application.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};

use crate::catalog::PriceCatalog;
use crate::recipes::RecipeBook;

/// Key holding the price catalog
pub const CATALOG_KEY: &str = "foodCostingMarketList";

/// Key holding the saved recipes
pub const RECIPES_KEY: &str = "foodCostingRecipes";

/// Minimal key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store, used in tests and when no database can be opened
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value store in a SQLite table
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening key-value store at: {}", path.display());
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// Use an already opened connection
    pub fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Initialize the key-value schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create kv_store table")?;
    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key '{key}'"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .with_context(|| format!("Failed to write key '{key}'"))?;
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw).with_context(|| format!("Failed to parse '{key}'"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn write_json<T: serde::Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).with_context(|| format!("Failed to serialize '{key}'"))?;
    store.set(key, &raw)
}

/// Load the price catalog, seeding it when absent or unreadable
pub fn load_catalog(store: &dyn KeyValueStore) -> PriceCatalog {
    match read_json::<PriceCatalog>(store, CATALOG_KEY) {
        Ok(Some(catalog)) => {
            info!("Loaded price catalog with {} item(s)", catalog.len());
            catalog
        }
        Ok(None) => {
            info!("No stored price catalog, using the default seed");
            PriceCatalog::seeded()
        }
        Err(e) => {
            error!("Failed to load price catalog, using the default seed: {:#}", e);
            PriceCatalog::seeded()
        }
    }
}

/// Persist the whole price catalog; failures are logged and reported as `false`
pub fn save_catalog(store: &mut dyn KeyValueStore, catalog: &PriceCatalog) -> bool {
    match write_json(store, CATALOG_KEY, catalog) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to save price catalog: {:#}", e);
            false
        }
    }
}

/// Load the saved recipes, starting empty when absent or unreadable
pub fn load_recipes(store: &dyn KeyValueStore) -> RecipeBook {
    match read_json::<RecipeBook>(store, RECIPES_KEY) {
        Ok(Some(book)) => {
            info!("Loaded {} saved recipe(s)", book.len());
            book
        }
        Ok(None) => RecipeBook::new(),
        Err(e) => {
            warn!("Failed to load saved recipes, starting empty: {:#}", e);
            RecipeBook::new()
        }
    }
}

/// Persist all saved recipes; failures are logged and reported as `false`
pub fn save_recipes(store: &mut dyn KeyValueStore, book: &RecipeBook) -> bool {
    match write_json(store, RECIPES_KEY, book) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to save recipes: {:#}", e);
            false
        }
    }
}
