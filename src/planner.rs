// src/planner.rs

//! The three operations a presentation layer calls.
//!
//! `InventoryPlanner` holds no per-request state: every call re-reads its
//! sources and gets explicit arguments, so any host can drive it.

use crate::error::PlannerResult;
use crate::forecast::additive::AdditiveSeasonalModel;
use crate::forecast::forecaster::{forecast_sku, DemandForecast};
use crate::forecast::traits::DemandModel;
use crate::io::sources::{InventorySource, SalesSource};
use crate::model::catalog::ProductCatalog;
use crate::simulation::config::PlannerConfig;
use crate::simulation::engine::{simulate_sku, SimulationResult};
use tracing::debug;

#[derive(Debug)]
pub struct InventoryPlanner<S, M = AdditiveSeasonalModel> {
    sources: S,
    model: M,
}

impl<S> InventoryPlanner<S, AdditiveSeasonalModel>
where
    S: InventorySource + SalesSource,
{
    /// Planner with the default additive seasonal model.
    pub fn new(sources: S) -> Self {
        Self::with_model(sources, AdditiveSeasonalModel::default())
    }

    /// Planner with a validated configuration.
    pub fn with_config(sources: S, config: PlannerConfig) -> PlannerResult<Self> {
        config.forecast.validate()?;
        Ok(Self::with_model(
            sources,
            AdditiveSeasonalModel::new(config.forecast),
        ))
    }
}

impl<S, M> InventoryPlanner<S, M>
where
    S: InventorySource + SalesSource,
    M: DemandModel,
{
    /// Planner backed by any fitting capability.
    pub fn with_model(sources: S, model: M) -> Self {
        Self { sources, model }
    }

    pub fn sources(&self) -> &S {
        &self.sources
    }

    /// `product_name -> sku` for every inventory row, in row order.
    pub fn list_products(&self) -> PlannerResult<ProductCatalog> {
        let records = self.sources.load_inventory()?;
        let catalog = ProductCatalog::from_records(&records);
        debug!(products = catalog.len(), "listed products");
        Ok(catalog)
    }

    /// Demand forecast for `sku` over history plus `horizon_days`.
    pub fn forecast(&self, sku: &str, horizon_days: usize) -> PlannerResult<DemandForecast> {
        forecast_sku(&self.sources, &self.model, sku, horizon_days)
    }

    /// Waste and revenue for no discount vs. `discount_rate`.
    pub fn simulate(
        &self,
        sku: &str,
        forecast_total: f64,
        discount_rate: f64,
        stock_multiplier: f64,
    ) -> PlannerResult<SimulationResult> {
        simulate_sku(
            &self.sources,
            sku,
            forecast_total,
            discount_rate,
            stock_multiplier,
        )
    }
}
