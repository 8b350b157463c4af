// src/simulation/engine.rs

use crate::error::{PlannerError, PlannerResult};
use crate::io::sources::InventorySource;
use crate::model::records::InventoryRecord;
use crate::simulation::config::ELASTICITY;
use serde::Serialize;
use tracing::{info, warn};

/// Baseline vs. promotion outcome for one SKU.
// Serialize so it can go straight into a CSV report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub current_stock: f64,
    pub days_to_expire: u32,
    pub base_waste_kg: f64,
    pub promo_waste_kg: f64,
    pub base_revenue: f64,
    pub promo_revenue: f64,
}

impl SimulationResult {
    /// Promo waste minus baseline waste. Negative means the promotion saves stock.
    pub fn waste_delta_kg(&self) -> f64 {
        self.promo_waste_kg - self.base_waste_kg
    }

    /// Promo revenue minus baseline revenue.
    pub fn revenue_delta(&self) -> f64 {
        self.promo_revenue - self.base_revenue
    }
}

/// Demand under a discount: `forecast_total * (1 + discount_rate * ELASTICITY)`.
pub fn promo_demand(forecast_total: f64, discount_rate: f64) -> f64 {
    let uplift = discount_rate * ELASTICITY;
    forecast_total * (1.0 + uplift)
}

/// Rejects arguments outside their domain before anything is read.
///
/// A negative `forecast_total` is accepted: a fitted trend on a declining
/// series can extrapolate below zero, and the formulas still apply to it.
pub fn validate_scenario(
    forecast_total: f64,
    discount_rate: f64,
    stock_multiplier: f64,
) -> PlannerResult<()> {
    if !forecast_total.is_finite() {
        return Err(PlannerError::invalid(
            "forecast_total",
            format!("must be a finite number, got {}", forecast_total),
        ));
    }
    if !(0.0..1.0).contains(&discount_rate) {
        return Err(PlannerError::invalid(
            "discount_rate",
            format!("must be in [0, 1), got {}", discount_rate),
        ));
    }
    if !stock_multiplier.is_finite() || stock_multiplier <= 0.0 {
        return Err(PlannerError::invalid(
            "stock_multiplier",
            format!("must be a positive number, got {}", stock_multiplier),
        ));
    }
    Ok(())
}

/// Projects waste and revenue for one inventory row. No I/O.
///
/// Promo revenue is taken on the full promotional demand even when it
/// exceeds the stock on hand; waste is clamped at zero.
pub fn project(
    record: &InventoryRecord,
    forecast_total: f64,
    discount_rate: f64,
    stock_multiplier: f64,
) -> SimulationResult {
    let current_stock = record.stock_on_hand_kg * stock_multiplier;

    // Baseline: no discount
    let base_waste_kg = (current_stock - forecast_total).max(0.0);
    let base_revenue = forecast_total * record.list_price;

    // Promotion
    let promo_demand = promo_demand(forecast_total, discount_rate);
    let promo_waste_kg = (current_stock - promo_demand).max(0.0);
    let promo_revenue = promo_demand * record.list_price * (1.0 - discount_rate);

    SimulationResult {
        current_stock,
        days_to_expire: record.shelf_life_days,
        base_waste_kg,
        promo_waste_kg,
        base_revenue,
        promo_revenue,
    }
}

/// Looks up `sku` and runs `project` on it.
///
/// # Arguments
/// * `sources` - Inventory snapshot.
/// * `sku` - Must match exactly one inventory row.
/// * `forecast_total` - Demand over the horizon, as returned by the forecaster.
///   May be negative.
/// * `discount_rate` - Fraction off list price, in `[0, 1)`.
/// * `stock_multiplier` - Scales stock on hand for over/understock scenarios.
pub fn simulate_sku<S: InventorySource>(
    sources: &S,
    sku: &str,
    forecast_total: f64,
    discount_rate: f64,
    stock_multiplier: f64,
) -> PlannerResult<SimulationResult> {
    validate_scenario(forecast_total, discount_rate, stock_multiplier)?;
    let record = sources.find_sku(sku)?;
    if forecast_total < 0.0 {
        warn!(sku, forecast_total, "negative demand forecast, waste exceeds stock");
    }
    let result = project(&record, forecast_total, discount_rate, stock_multiplier);
    info!(
        sku,
        discount_rate,
        base_waste_kg = result.base_waste_kg,
        promo_waste_kg = result.promo_waste_kg,
        "simulated promotion"
    );
    Ok(result)
}
