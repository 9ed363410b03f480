//! # Unit Conversion Module
//!
//! Resolves the numeric factor between a purchase unit and a recipe unit.
//!
//! Only three closed unit families are understood:
//!
//! - **Mass**: `kg`, `g`
//! - **Volume**: `liter`, `ml`
//! - **Piece**: `pc`, `pcs`, `piece`, `pieces`
//!
//! Anything else (cross-family pairs, unknown units such as `cup`) resolves to
//! a factor of `1`, meaning a manual conversion factor has to be entered.
//!
//! ## Usage
//!
//! ```rust
//! use food_costing::units::resolve;
//!
//! assert_eq!(resolve("kg", "g"), 1000.0);
//! assert_eq!(resolve("pc", "pcs"), 1.0);
//! assert_eq!(resolve("kg", "ml"), 1.0);
//! ```

/// Units that all describe a single item, equivalent 1:1
pub const PIECE_UNITS: [&str; 4] = ["pc", "pcs", "piece", "pieces"];

/// Mass units and their size in grams
const MASS_UNITS: [(&str, f64); 2] = [("kg", 1000.0), ("g", 1.0)];

/// Volume units and their size in milliliters
const VOLUME_UNITS: [(&str, f64); 2] = [("liter", 1000.0), ("ml", 1.0)];

/// Recipe unit used when the extraction service returns none
pub const DEFAULT_RECIPE_UNIT: &str = "pc";

/// Spellings of "piece" the extraction service tends to produce
const PIECE_SYNONYMS: [&str; 3] = ["piece", "pieces", "pcs."];

/// The closed unit families the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    /// Weight, based on grams
    Mass,
    /// Volume, based on milliliters
    Volume,
    /// Individual items
    Piece,
}

/// Classify a unit tag (case-insensitive, surrounding whitespace ignored)
pub fn family_of(unit: &str) -> Option<UnitFamily> {
    let unit = unit.trim().to_lowercase();
    if PIECE_UNITS.contains(&unit.as_str()) {
        Some(UnitFamily::Piece)
    } else if MASS_UNITS.iter().any(|(name, _)| *name == unit) {
        Some(UnitFamily::Mass)
    } else if VOLUME_UNITS.iter().any(|(name, _)| *name == unit) {
        Some(UnitFamily::Volume)
    } else {
        None
    }
}

/// Check whether a unit belongs to the piece family
pub fn is_piece_unit(unit: &str) -> bool {
    family_of(unit) == Some(UnitFamily::Piece)
}

/// Size of a mass or volume unit in its family's base unit
fn base_size(unit: &str) -> Option<f64> {
    MASS_UNITS
        .iter()
        .chain(VOLUME_UNITS.iter())
        .find(|(name, _)| *name == unit)
        .map(|(_, size)| *size)
}

/// Check whether `resolve` knows a real conversion for this pair
///
/// Returns `false` for cross-family or unrecognized pairs, where `resolve`
/// falls back to the identity factor.
pub fn is_resolvable(purchase_unit: &str, recipe_unit: &str) -> bool {
    match (family_of(purchase_unit), family_of(recipe_unit)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Resolve how many recipe units are contained in one purchase unit
///
/// Never fails and always returns a positive number. Unresolvable pairs
/// yield `1`.
///
/// # Examples
///
/// ```rust
/// use food_costing::units::resolve;
///
/// assert_eq!(resolve("KG", "g"), 1000.0);
/// assert_eq!(resolve("g", "kg"), 0.001);
/// assert_eq!(resolve("liter", "ml"), 1000.0);
/// ```
pub fn resolve(purchase_unit: &str, recipe_unit: &str) -> f64 {
    let purchase = purchase_unit.trim().to_lowercase();
    let recipe = recipe_unit.trim().to_lowercase();

    match (family_of(&purchase), family_of(&recipe)) {
        (Some(UnitFamily::Piece), Some(UnitFamily::Piece)) => 1.0,
        (Some(a), Some(b)) if a == b => match (base_size(&purchase), base_size(&recipe)) {
            (Some(p), Some(r)) => p / r,
            _ => 1.0,
        },
        _ => 1.0,
    }
}

/// Normalize a recipe unit coming from the extraction service
///
/// Missing units default to `pc`, the result is lower-cased and the common
/// "piece" spellings collapse to `pc`.
pub fn normalize_recipe_unit(unit: Option<&str>) -> String {
    let unit = unit
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_RECIPE_UNIT)
        .to_lowercase();

    if PIECE_SYNONYMS.contains(&unit.as_str()) {
        DEFAULT_RECIPE_UNIT.to_string()
    } else {
        unit
    }
}
