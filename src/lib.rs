//! # Food Costing
//!
//! A recipe cost estimator. Ingredient lines are priced from a catalog of
//! purchase prices, converted between purchase and recipe units, and rolled
//! up into a grand total, cost per serving and selling price. Recipes can be
//! imported from free text through an extraction service, saved, reloaded and
//! exported as CSV.

pub mod catalog;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod extraction_config;
pub mod ledger;
pub mod localization;
pub mod pricing;
pub mod recipes;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod units;
pub mod workspace;

pub use catalog::{CatalogItem, PriceCatalog};
pub use ledger::{ConversionMode, IngredientLedger, IngredientLine, LineEdit};
pub use pricing::{CostSummary, Pricing, PricingMethod};
pub use session::CostingSession;
pub use workspace::Workspace;
