//! # Pricing Module
//!
//! Turns the ledger's grand total into a selling price. The selling price is
//! the only stored value; food-cost percentage and pricing factor are always
//! derived from it, so switching between the two pricing methods never drifts.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

/// Which control the user prices the recipe with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PricingMethod {
    /// Selling price from a target food-cost percentage
    #[default]
    CostPercentage,
    /// Selling price as a multiple of the grand total
    FactorPricing,
}

impl PricingMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PricingMethod::CostPercentage => "Cost Percentage",
            PricingMethod::FactorPricing => "Factor Pricing",
        }
    }
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parse a numeric text field; anything unparsable becomes 0
pub fn parse_numeric_input(input: &str) -> f64 {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Yield is at least one serving worth; non-positive input becomes 1
pub fn coerce_yield(yield_count: f64) -> f64 {
    if yield_count.is_finite() && yield_count > 0.0 {
        yield_count
    } else {
        1.0
    }
}

fn coerce_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

/// Selling price, yield and pricing method of the live recipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    selling_price: f64,
    yield_count: f64,
    #[serde(default)]
    method: PricingMethod,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            selling_price: 0.0,
            yield_count: 1.0,
            method: PricingMethod::default(),
        }
    }
}

impl Pricing {
    pub fn new(selling_price: f64, yield_count: f64) -> Self {
        Self {
            selling_price: coerce_price(selling_price),
            yield_count: coerce_yield(yield_count),
            method: PricingMethod::default(),
        }
    }

    pub fn selling_price(&self) -> f64 {
        self.selling_price
    }

    pub fn yield_count(&self) -> f64 {
        self.yield_count
    }

    pub fn method(&self) -> PricingMethod {
        self.method
    }

    pub fn set_selling_price(&mut self, price: f64) {
        self.selling_price = coerce_price(price);
    }

    pub fn set_yield(&mut self, yield_count: f64) {
        self.yield_count = coerce_yield(yield_count);
    }

    pub fn set_method(&mut self, method: PricingMethod) {
        self.method = method;
    }

    pub fn cost_per_serving(&self, grand_total: f64) -> f64 {
        grand_total / self.yield_count
    }

    /// Grand total as a percentage of the selling price
    pub fn food_cost_percentage(&self, grand_total: f64) -> f64 {
        if self.selling_price > 0.0 {
            grand_total / self.selling_price * 100.0
        } else {
            0.0
        }
    }

    /// Multiplier from grand total to selling price
    pub fn pricing_factor(&self, grand_total: f64) -> f64 {
        if grand_total > 0.0 && self.selling_price > 0.0 {
            self.selling_price / grand_total
        } else {
            0.0
        }
    }

    /// Solve the selling price for a target food-cost percentage
    ///
    /// Returns `false` and leaves the price alone when the percentage or the
    /// grand total is not positive.
    pub fn set_from_target_percentage(&mut self, percentage: f64, grand_total: f64) -> bool {
        if !(percentage > 0.0 && grand_total > 0.0) || !percentage.is_finite() {
            debug!("Ignoring target percentage {} for total {}", percentage, grand_total);
            return false;
        }
        self.selling_price = grand_total / (percentage / 100.0);
        true
    }

    /// Solve the selling price for a pricing factor
    pub fn set_from_pricing_factor(&mut self, factor: f64, grand_total: f64) -> bool {
        if !(factor > 0.0 && grand_total > 0.0) || !factor.is_finite() {
            debug!("Ignoring pricing factor {} for total {}", factor, grand_total);
            return false;
        }
        self.selling_price = grand_total * factor;
        true
    }

    /// Snapshot every derived value for a grand total
    pub fn summarize(&self, grand_total: f64) -> CostSummary {
        CostSummary {
            grand_total,
            yield_count: self.yield_count,
            cost_per_serving: self.cost_per_serving(grand_total),
            method: self.method,
            selling_price: self.selling_price,
            food_cost_percentage: self.food_cost_percentage(grand_total),
            pricing_factor: self.pricing_factor(grand_total),
        }
    }
}

/// All derived cost figures of a recipe at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub grand_total: f64,
    pub yield_count: f64,
    pub cost_per_serving: f64,
    pub method: PricingMethod,
    pub selling_price: f64,
    pub food_cost_percentage: f64,
    pub pricing_factor: f64,
}

impl fmt::Display for CostSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grand Total:          {:.2}", self.grand_total)?;
        writeln!(f, "Yield (Servings):     {}", self.yield_count)?;
        writeln!(f, "Cost per Serving:     {:.2}", self.cost_per_serving)?;
        writeln!(f, "Pricing Method:       {}", self.method)?;
        match self.method {
            PricingMethod::CostPercentage => {
                writeln!(f, "Target Food Cost %:   {:.2}%", self.food_cost_percentage)?
            }
            PricingMethod::FactorPricing => {
                writeln!(f, "Pricing Factor:       {:.2}", self.pricing_factor)?
            }
        }
        writeln!(f, "Recipe Selling Price: {:.2}", self.selling_price)?;
        write!(f, "Final Food Cost %:    {:.2}%", self.food_cost_percentage)
    }
}
