//! Demand forecasting and markdown simulation for perishable stock.
//!
//! Three operations, exposed through [`InventoryPlanner`]:
//! - `list_products` maps product names to SKUs,
//! - `forecast` fits a seasonal demand model for one SKU and sums a horizon,
//! - `simulate` compares waste and revenue with and without a discount.

pub mod error;
pub mod forecast;
pub mod io;
pub mod model;
pub mod planner;
pub mod simulation;

pub use error::{PlannerError, PlannerResult};
pub use forecast::additive::AdditiveSeasonalModel;
pub use forecast::config::ForecastConfig;
pub use forecast::forecaster::DemandForecast;
pub use forecast::traits::{DemandModel, FitError, FittedDemandModel, ForecastPoint};
pub use io::sources::{CsvSources, InMemorySources, InventorySource, SalesSource};
pub use model::catalog::ProductCatalog;
pub use model::records::{InventoryRecord, SalesObservation};
pub use planner::InventoryPlanner;
pub use simulation::config::{
    PlannerConfig, DEFAULT_HORIZON_DAYS, DEFAULT_STOCK_MULTIPLIER, ELASTICITY,
};
pub use simulation::engine::SimulationResult;
