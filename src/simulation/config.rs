// src/simulation/config.rs

use crate::forecast::config::ForecastConfig;

/// Days summed into the forecast total when the caller does not choose.
pub const DEFAULT_HORIZON_DAYS: usize = 7;

/// Stock scaling for the plain "as counted" scenario.
pub const DEFAULT_STOCK_MULTIPLIER: f64 = 1.0;

/// Demand uplift fraction per unit of discount fraction.
pub const ELASTICITY: f64 = 2.5;

/// Top-level settings handed to `InventoryPlanner`.
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    pub forecast: ForecastConfig,
}
