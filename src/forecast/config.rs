// src/forecast/config.rs

use crate::error::{PlannerError, PlannerResult};

/// Settings of the additive seasonal demand model.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub weekly_seasonality: bool,
    pub yearly_seasonality: bool,
    pub weekly_fourier_order: usize,
    pub yearly_fourier_order: usize,
    /// Maximum number of potential trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    /// Coverage of the `[yhat_lower, yhat_upper]` band, e.g. 0.8.
    pub interval_width: f64,
    /// Monte Carlo paths used for the uncertainty band. Zero disables it.
    pub uncertainty_samples: usize,
    pub seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            weekly_seasonality: true,
            yearly_seasonality: true,
            weekly_fourier_order: 3,
            yearly_fourier_order: 10,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: 42,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(PlannerError::invalid(
                "interval_width",
                format!("must be in (0, 1), got {}", self.interval_width),
            ));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(PlannerError::invalid(
                "changepoint_range",
                format!("must be in (0, 1], got {}", self.changepoint_range),
            ));
        }
        let scales = [
            ("changepoint_prior_scale", self.changepoint_prior_scale),
            ("seasonality_prior_scale", self.seasonality_prior_scale),
        ];
        for (param, value) in scales {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlannerError::invalid(
                    param,
                    format!("must be a positive number, got {}", value),
                ));
            }
        }
        Ok(())
    }
}
