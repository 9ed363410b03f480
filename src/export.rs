//! # Export Module
//!
//! Writes the costing table as CSV: one row per named ingredient, a blank
//! row, then a summary block with the pricing figures.
//!
//! Currency is shown with 2 decimals, unit cost with 4, percentages with 2.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::ledger::IngredientLine;
use crate::pricing::{CostSummary, PricingMethod};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₱";

const HEADERS: [&str; 7] = [
    "QTY",
    "UNIT",
    "INGREDIENT",
    "PURCHASE PRICE",
    "UNIT CONVERSION",
    "UNIT COST",
    "EXTENSION COST",
];

/// Formatting options for exported tables
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub currency_symbol: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// Format a number with thousands separators and a fixed number of decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Currency with 2 decimals, e.g. "₱1,234.50"
pub fn format_currency(value: f64, symbol: &str) -> String {
    format!("{symbol}{}", format_number(value, 2))
}

/// Unit cost with 4 decimals, e.g. "₱0.0800"
pub fn format_unit_cost(value: f64, symbol: &str) -> String {
    format!("{symbol}{}", format_number(value, 4))
}

/// A percentage value (40 means 40%) with 2 decimals
pub fn format_percentage(percentage: f64) -> String {
    format!("{}%", format_number(percentage, 2))
}

/// Conversion factors: whole numbers without decimals, others with up to 4
pub fn format_factor(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value, 0)
    } else {
        let text = format_number(value, 4);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Table row for one ingredient line
pub fn ingredient_row(line: &IngredientLine, options: &ExportOptions) -> Vec<String> {
    let symbol = options.currency_symbol.as_str();
    vec![
        format_number(line.quantity, 2),
        line.unit.clone(),
        line.name.clone(),
        format!("{} / {}", format_currency(line.purchase_price, symbol), line.purchase_unit),
        format_factor(line.conversion_factor),
        format_unit_cost(line.unit_cost(), symbol),
        format_currency(line.extension_cost(), symbol),
    ]
}

/// Label/value pairs of the summary block
pub fn summary_rows(summary: &CostSummary, options: &ExportOptions) -> Vec<(String, String)> {
    let symbol = options.currency_symbol.as_str();
    let mut rows = vec![
        ("Grand Total:".to_string(), format_currency(summary.grand_total, symbol)),
        ("Yield (Servings):".to_string(), format_number(summary.yield_count, 0)),
        ("Cost per Serving:".to_string(), format_currency(summary.cost_per_serving, symbol)),
        ("Pricing Method:".to_string(), summary.method.label().to_string()),
    ];

    rows.push(match summary.method {
        PricingMethod::CostPercentage => (
            "Target Food Cost %:".to_string(),
            format_percentage(summary.food_cost_percentage),
        ),
        PricingMethod::FactorPricing => (
            "Pricing Factor:".to_string(),
            format_number(summary.pricing_factor, 2),
        ),
    });

    rows.push((
        "Recipe Selling Price:".to_string(),
        format_currency(summary.selling_price, symbol),
    ));
    rows.push((
        "Final Food Cost %:".to_string(),
        format_percentage(summary.food_cost_percentage),
    ));
    rows
}

/// Write the costing table as CSV
pub fn write_csv<W: Write>(
    writer: W,
    lines: &[IngredientLine],
    summary: &CostSummary,
    options: &ExportOptions,
) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    csv.write_record(HEADERS).context("Failed to write header row")?;

    let named = lines.iter().filter(|line| !line.name.trim().is_empty());
    for line in named {
        csv.write_record(ingredient_row(line, options))
            .with_context(|| format!("Failed to write row for '{}'", line.name))?;
    }

    csv.write_record([""; 7]).context("Failed to write separator row")?;

    for (label, value) in summary_rows(summary, options) {
        csv.write_record(["", "", "", "", "", label.as_str(), value.as_str()])
            .context("Failed to write summary row")?;
    }

    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write the costing table to a CSV file
pub fn export_to_path(
    path: impl AsRef<Path>,
    lines: &[IngredientLine],
    summary: &CostSummary,
    options: &ExportOptions,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, lines, summary, options)?;
    info!("Exported costing table to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::Pricing;

    fn flour() -> IngredientLine {
        IngredientLine {
            name: "Flour".to_string(),
            quantity: 1000.0,
            purchase_price: 80.0,
            ..IngredientLine::blank()
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(-1500.5, 2), "-1,500.50");
        assert_eq!(format_number(-0.0001, 2), "0.00");
    }

    #[test]
    fn test_specific_formats() {
        assert_eq!(format_currency(80.0, "₱"), "₱80.00");
        assert_eq!(format_unit_cost(0.08, "$"), "$0.0800");
        assert_eq!(format_percentage(40.0), "40.00%");
        assert_eq!(format_factor(1000.0), "1,000");
        assert_eq!(format_factor(0.001), "0.001");
        assert_eq!(format_factor(2.5), "2.5");
    }

    #[test]
    fn test_ingredient_row() {
        let row = ingredient_row(&flour(), &ExportOptions::default());
        assert_eq!(
            row,
            vec!["1,000.00", "g", "Flour", "₱80.00 / kg", "1,000", "₱0.0800", "₱80.00"]
        );
    }

    #[test]
    fn test_summary_rows_follow_method() {
        let mut pricing = Pricing::new(200.0, 8.0);
        let rows = summary_rows(&pricing.summarize(80.0), &ExportOptions::default());
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[4], ("Target Food Cost %:".to_string(), "40.00%".to_string()));
        assert_eq!(rows[6].1, "40.00%");

        pricing.set_method(PricingMethod::FactorPricing);
        let rows = summary_rows(&pricing.summarize(80.0), &ExportOptions::default());
        assert_eq!(rows[4], ("Pricing Factor:".to_string(), "2.50".to_string()));
    }

    #[test]
    fn test_write_csv_skips_unnamed_lines() -> Result<()> {
        let lines = vec![flour(), IngredientLine::blank()];
        let summary = Pricing::new(200.0, 8.0).summarize(80.0);

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &lines, &summary, &ExportOptions::default())?;
        let text = String::from_utf8(buffer)?;
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows[0], "QTY,UNIT,INGREDIENT,PURCHASE PRICE,UNIT CONVERSION,UNIT COST,EXTENSION COST");
        assert!(rows[1].contains("Flour"));
        assert_eq!(rows.len(), 1 + 1 + 1 + 7);
        assert!(text.contains("Grand Total:,₱80.00"));
        assert!(text.contains("Cost per Serving:,₱10.00"));
        Ok(())
    }
}
