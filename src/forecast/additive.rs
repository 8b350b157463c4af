// src/forecast/additive.rs

//! Additive trend + seasonality demand model.
//!
//! The prediction for a day is `trend(t) + weekly(day) + yearly(day)` where
//! the trend is piecewise linear with a fixed set of potential changepoints
//! and each seasonality is a truncated Fourier series. Coefficients are the
//! MAP estimate under Gaussian priors, i.e. a ridge regression on the scaled
//! series. The uncertainty band is built from seeded Monte Carlo paths that
//! add future trend changes and observation noise to the point prediction.

use crate::forecast::linalg::solve_ridge;
use crate::forecast::traits::{
    DemandModel, FitError, FittedDemandModel, ForecastPoint, Observation,
};
use crate::forecast::config::ForecastConfig;
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution, Exp, Normal, Uniform};
use std::f64::consts::PI;
use tracing::{info, warn};

/// Prior standard deviation of the base growth rate and offset.
const TREND_PRIOR_SCALE: f64 = 5.0;
/// Ridge solve / noise re-estimation rounds.
const NOISE_PASSES: usize = 4;
/// Floor on the scaled noise variance; keeps the ridge system well posed.
const MIN_NOISE_VAR: f64 = 1e-4;
const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;
/// Yearly ridge weight on a history of at least one full year. Shorter
/// histories get `(YEARLY_PERIOD / span_days)²`.
const YEARLY_PENALTY_FLOOR: f64 = 1.0;
/// `num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, Copy)]
struct Seasonality {
    period: f64,
    order: usize,
}

impl Seasonality {
    fn width(&self) -> usize {
        2 * self.order
    }

    fn push_features(&self, day: f64, out: &mut Vec<f64>) {
        for k in 1..=self.order {
            let x = 2.0 * PI * k as f64 * day / self.period;
            out.push(x.sin());
            out.push(x.cos());
        }
    }

    fn evaluate(&self, day: f64, coefficients: &[f64]) -> f64 {
        let mut features = Vec::with_capacity(self.width());
        self.push_features(day, &mut features);
        features.iter().zip(coefficients).map(|(x, b)| x * b).sum()
    }
}

fn epoch_day(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE) as f64
}

/// Linear interpolation between order statistics of an ascending slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// =========================================================================
// Model
// =========================================================================

#[derive(Debug, Clone, Default)]
pub struct AdditiveSeasonalModel {
    config: ForecastConfig,
}

impl AdditiveSeasonalModel {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    fn weekly(&self) -> Option<Seasonality> {
        (self.config.weekly_seasonality && self.config.weekly_fourier_order > 0).then(|| {
            Seasonality {
                period: WEEKLY_PERIOD,
                order: self.config.weekly_fourier_order,
            }
        })
    }

    fn yearly(&self) -> Option<Seasonality> {
        (self.config.yearly_seasonality && self.config.yearly_fourier_order > 0).then(|| {
            Seasonality {
                period: YEARLY_PERIOD,
                order: self.config.yearly_fourier_order,
            }
        })
    }

    /// Changepoints at evenly spaced observation indices over the first
    /// `changepoint_range` of the sorted history.
    fn place_changepoints(&self, t: &[f64]) -> Vec<f64> {
        let hist_size = (t.len() as f64 * self.config.changepoint_range).floor() as usize;
        let count = self
            .config
            .n_changepoints
            .min(hist_size.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }
        (1..=count)
            .map(|i| {
                let idx = (i as f64 * (hist_size - 1) as f64 / count as f64).round() as usize;
                t[idx]
            })
            .collect()
    }
}

impl DemandModel for AdditiveSeasonalModel {
    type Fitted = FittedAdditiveModel;

    fn fit(&self, history: &[Observation]) -> Result<FittedAdditiveModel, FitError> {
        let n = history.len();
        if n < 2 {
            return Err(FitError::TooFewObservations(n));
        }
        if history.iter().any(|obs| !obs.value.is_finite()) {
            return Err(FitError::NonFinite);
        }

        let mut sorted = history.to_vec();
        sorted.sort_by_key(|obs| obs.date);
        let start = sorted[0].date;
        let end = sorted[n - 1].date;
        let span_days = (end - start).num_days() as f64;
        if span_days <= 0.0 {
            return Err(FitError::ZeroSpan);
        }

        let max_abs = sorted.iter().map(|obs| obs.value.abs()).fold(0.0, f64::max);
        let y_scale = if max_abs > 0.0 {
            max_abs
        } else {
            warn!(observations = n, "all observations are zero");
            1.0
        };

        let t: Vec<f64> = sorted
            .iter()
            .map(|obs| (obs.date - start).num_days() as f64 / span_days)
            .collect();
        let y: Vec<f64> = sorted.iter().map(|obs| obs.value / y_scale).collect();

        let changepoints = self.place_changepoints(&t);
        let weekly = self.weekly();
        let yearly = self.yearly();

        let layout = Layout {
            changepoints: &changepoints,
            weekly,
            yearly,
            yearly_floor: yearly_penalty_floor(span_days),
        };
        let rows: Vec<Vec<f64>> = sorted
            .iter()
            .zip(&t)
            .map(|(obs, &ti)| layout.row(ti, epoch_day(obs.date)))
            .collect();

        let mean = y.iter().sum::<f64>() / n as f64;
        let mut sigma2 = (y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64)
            .max(MIN_NOISE_VAR);
        let mut beta = Vec::new();
        for _ in 0..NOISE_PASSES {
            let penalty = layout.penalty(sigma2, &self.config);
            beta = solve_ridge(&rows, &y, &penalty).ok_or(FitError::Singular)?;
            if beta.iter().any(|b| !b.is_finite()) {
                return Err(FitError::Singular);
            }
            let rss: f64 = rows
                .iter()
                .zip(&y)
                .map(|(row, target)| {
                    let fitted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
                    (target - fitted).powi(2)
                })
                .sum();
            sigma2 = (rss / n as f64).max(MIN_NOISE_VAR);
        }

        let mut history_dates: Vec<NaiveDate> = sorted.iter().map(|obs| obs.date).collect();
        history_dates.dedup();
        let min_dt = history_dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64 / span_days)
            .fold(f64::INFINITY, f64::min);

        let fitted = FittedAdditiveModel {
            config: self.config.clone(),
            weekly,
            yearly,
            start,
            span_days,
            y_scale,
            changepoints,
            beta,
            sigma: sigma2.sqrt(),
            min_dt,
            history_dates,
            observations: n,
        };
        info!(
            observations = n,
            days = fitted.history_dates.len(),
            changepoints = fitted.changepoints.len(),
            sigma = fitted.sigma * y_scale,
            "fitted additive demand model"
        );
        Ok(fitted)
    }
}

/// Lower bound on the yearly ridge weights for a history of `span_days`.
///
/// The weights otherwise shrink with the residual variance, and on less than
/// a year of data the yearly terms then trade off freely against the trend.
fn yearly_penalty_floor(span_days: f64) -> f64 {
    YEARLY_PENALTY_FLOOR * (YEARLY_PERIOD / span_days).max(1.0).powi(2)
}

/// Column layout of the design matrix:
/// `[offset, growth, changepoint deltas.., weekly.., yearly..]`.
struct Layout<'a> {
    changepoints: &'a [f64],
    weekly: Option<Seasonality>,
    yearly: Option<Seasonality>,
    yearly_floor: f64,
}

impl Layout<'_> {
    fn width(&self) -> usize {
        2 + self.changepoints.len()
            + self.weekly.map_or(0, |s| s.width())
            + self.yearly.map_or(0, |s| s.width())
    }

    fn row(&self, t: f64, day: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&c| (t - c).max(0.0)));
        if let Some(weekly) = &self.weekly {
            weekly.push_features(day, &mut row);
        }
        if let Some(yearly) = &self.yearly {
            yearly.push_features(day, &mut row);
        }
        row
    }

    /// Ridge weights `sigma² / prior_sd²` per column, yearly ones floored.
    fn penalty(&self, sigma2: f64, config: &ForecastConfig) -> Vec<f64> {
        let trend = sigma2 / TREND_PRIOR_SCALE.powi(2);
        let delta = sigma2 / config.changepoint_prior_scale.powi(2);
        let seasonal = sigma2 / config.seasonality_prior_scale.powi(2);
        let yearly = seasonal.max(self.yearly_floor);

        let mut penalty = vec![trend, trend];
        penalty.extend(std::iter::repeat(delta).take(self.changepoints.len()));
        penalty.extend(std::iter::repeat(seasonal).take(self.weekly.map_or(0, |s| s.width())));
        penalty.extend(std::iter::repeat(yearly).take(self.yearly.map_or(0, |s| s.width())));
        penalty
    }
}

// =========================================================================
// Fitted model
// =========================================================================

#[derive(Debug, Clone)]
pub struct FittedAdditiveModel {
    config: ForecastConfig,
    weekly: Option<Seasonality>,
    yearly: Option<Seasonality>,
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    /// Changepoint locations on the scaled time axis.
    changepoints: Vec<f64>,
    beta: Vec<f64>,
    /// Residual standard deviation, scaled units.
    sigma: f64,
    /// Smallest gap between distinct history days, scaled units.
    min_dt: f64,
    history_dates: Vec<NaiveDate>,
    observations: usize,
}

/// Scaled-unit components of one prediction.
struct Components {
    trend: f64,
    weekly: f64,
    yearly: f64,
}

impl FittedAdditiveModel {
    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    /// Residual standard deviation in original units.
    pub fn residual_sigma(&self) -> f64 {
        self.sigma * self.y_scale
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn deltas(&self) -> &[f64] {
        &self.beta[2..2 + self.changepoints.len()]
    }

    fn components(&self, date: NaiveDate) -> Components {
        let t = self.scaled_time(date);
        let day = epoch_day(date);

        let trend = self.beta[0]
            + self.beta[1] * t
            + self
                .changepoints
                .iter()
                .zip(self.deltas())
                .map(|(&c, &d)| d * (t - c).max(0.0))
                .sum::<f64>();

        let mut offset = 2 + self.changepoints.len();
        let weekly = match &self.weekly {
            Some(s) => {
                let v = s.evaluate(day, &self.beta[offset..offset + s.width()]);
                offset += s.width();
                v
            }
            None => 0.0,
        };
        let yearly = match &self.yearly {
            Some(s) => s.evaluate(day, &self.beta[offset..offset + s.width()]),
            None => 0.0,
        };

        Components {
            trend,
            weekly,
            yearly,
        }
    }

    /// New trend changepoints `(location, delta)` for each sample path,
    /// drawn at the historical changepoint rate over `(1, t_max]`.
    fn sample_future_changes(&self, rng: &mut StdRng, t_max: f64) -> Vec<Vec<(f64, f64)>> {
        let samples = self.config.uncertainty_samples;
        let mut paths = vec![Vec::new(); samples];
        if t_max <= 1.0 || self.changepoints.is_empty() || !self.min_dt.is_finite() {
            return paths;
        }

        let steps = ((t_max - 1.0) / self.min_dt).ceil();
        let prob = (self.changepoints.len() as f64 * (t_max - 1.0) / steps).min(1.0);
        let scale = self.deltas().iter().map(|d| d.abs()).sum::<f64>()
            / self.changepoints.len() as f64
            + 1e-8;

        let (Ok(count), Ok(magnitude)) = (Binomial::new(steps as u64, prob), Exp::new(1.0 / scale))
        else {
            return paths;
        };
        let location = Uniform::new(1.0, t_max);

        for path in &mut paths {
            let n = count.sample(rng);
            for _ in 0..n {
                let c = location.sample(rng);
                let mut delta = magnitude.sample(rng);
                if rng.gen_bool(0.5) {
                    delta = -delta;
                }
                path.push((c, delta));
            }
        }
        paths
    }

    /// `(lower, upper)` per point, scaled units.
    fn sample_bounds(&self, t: &[f64], yhat: &[f64]) -> Vec<(f64, f64)> {
        let samples = self.config.uncertainty_samples;
        if samples == 0 {
            return yhat.iter().map(|&v| (v, v)).collect();
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let t_max = t.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let future_changes = self.sample_future_changes(&mut rng, t_max);
        let noise = Normal::new(0.0, self.sigma).ok();

        let lower_q = (1.0 - self.config.interval_width) / 2.0;
        let upper_q = (1.0 + self.config.interval_width) / 2.0;

        let mut draws = vec![0.0; samples];
        t.iter()
            .zip(yhat)
            .map(|(&ti, &base)| {
                for (draw, changes) in draws.iter_mut().zip(&future_changes) {
                    let mut v = base;
                    for &(c, delta) in changes {
                        if ti > c {
                            v += delta * (ti - c);
                        }
                    }
                    if let Some(noise) = &noise {
                        v += noise.sample(&mut rng);
                    }
                    *draw = v;
                }
                draws.sort_by(f64::total_cmp);
                (percentile(&draws, lower_q), percentile(&draws, upper_q))
            })
            .collect()
    }
}

impl FittedDemandModel for FittedAdditiveModel {
    fn history_dates(&self) -> &[NaiveDate] {
        &self.history_dates
    }

    fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastPoint> {
        let last_observed = self.history_dates.last().copied();
        let components: Vec<Components> = dates.iter().map(|&d| self.components(d)).collect();
        let t: Vec<f64> = dates.iter().map(|&d| self.scaled_time(d)).collect();
        let yhat: Vec<f64> = components
            .iter()
            .map(|c| c.trend + c.weekly + c.yearly)
            .collect();
        let bounds = self.sample_bounds(&t, &yhat);

        dates
            .iter()
            .zip(components)
            .zip(yhat)
            .zip(bounds)
            .map(|(((&date, c), y), (lower, upper))| ForecastPoint {
                date,
                yhat: y * self.y_scale,
                yhat_lower: lower * self.y_scale,
                yhat_upper: upper * self.y_scale,
                trend: c.trend * self.y_scale,
                weekly: c.weekly * self.y_scale,
                yearly: c.yearly * self.y_scale,
                is_future: last_observed.map_or(false, |last| date > last),
            })
            .collect()
    }
}
