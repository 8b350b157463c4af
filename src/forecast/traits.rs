// src/forecast/traits.rs

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// A single training pair: the day and the quantity sold that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// One day of model output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
    /// True for days after the last observed date.
    pub is_future: bool,
}

/// Why a model could not be fitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least 2 observations, got {0}")]
    TooFewObservations(usize),

    #[error("all observations fall on a single day")]
    ZeroSpan,

    #[error("history contains a non-finite value")]
    NonFinite,

    #[error("normal equations are not positive definite")]
    Singular,
}

/// A time-series fitting capability.
///
/// We require `Debug` so the planner can be printed, and `Send + Sync` so a
/// host can share one model across worker threads.
pub trait DemandModel: std::fmt::Debug + Send + Sync {
    type Fitted: FittedDemandModel;

    /// Fits the model to `history`. Order does not matter and repeated dates
    /// are independent observations.
    fn fit(&self, history: &[Observation]) -> Result<Self::Fitted, FitError>;
}

/// A fitted model that can score arbitrary days.
pub trait FittedDemandModel {
    /// Distinct observed days, ascending.
    fn history_dates(&self) -> &[NaiveDate];

    /// Point prediction, bounds and components for each of `dates`, in order.
    fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastPoint>;

    /// The historical days followed by `horizon_days` contiguous future days,
    /// starting the day after the last observation.
    fn extended_dates(&self, horizon_days: usize) -> Vec<NaiveDate> {
        let history = self.history_dates();
        let mut dates = history.to_vec();
        if let Some(&last) = history.last() {
            dates.extend((1..=horizon_days as i64).map(|d| last + Duration::days(d)));
        }
        dates
    }
}
