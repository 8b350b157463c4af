// src/io/demand.rs

use crate::model::records::SalesObservation;
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Shape of a synthetic daily sales series.
#[derive(Debug, Clone)]
pub struct DemandProfile {
    /// Mean daily sales (kg) on day zero.
    pub base_kg: f64,
    /// Linear drift added per day (kg).
    pub trend_kg_per_day: f64,
    /// Extra sales on Saturdays and Sundays, as a fraction of the level.
    pub weekend_lift: f64,
    /// Standard deviation of the daily noise (kg).
    pub noise_sd: f64,
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self {
            base_kg: 20.0,
            trend_kg_per_day: 0.0,
            weekend_lift: 0.3,
            noise_sd: 2.0,
        }
    }
}

/// Generates a history where every day sells the exact same quantity.
/// Useful for checking that the forecaster reproduces a flat series.
pub fn generate_constant_sales(
    product_id: &str,
    start: NaiveDate,
    days: usize,
    qty_kg: f64,
) -> Vec<SalesObservation> {
    (0..days)
        .map(|d| SalesObservation::new(product_id, start + Duration::days(d as i64), qty_kg))
        .collect()
}

/// Generates a history from a `DemandProfile` with Normal noise.
///
/// The generator is seeded so repeated calls with the same arguments produce
/// the same series.
///
/// # Arguments
/// * `product_id` - Join key written on every row.
/// * `start` - First calendar day.
/// * `days` - Number of consecutive days.
/// * `profile` - Level, drift, weekly pattern and volatility.
/// * `seed` - RNG seed.
pub fn generate_seasonal_sales(
    product_id: &str,
    start: NaiveDate,
    days: usize,
    profile: &DemandProfile,
    seed: u64,
) -> Vec<SalesObservation> {
    let mut rng = StdRng::seed_from_u64(seed);
    // A zero sd is a valid Normal; only NaN/negative sd fails.
    let noise = Normal::new(0.0, profile.noise_sd.max(0.0)).ok();

    let mut history = Vec::with_capacity(days);
    for d in 0..days {
        let date = start + Duration::days(d as i64);
        let level = profile.base_kg + profile.trend_kg_per_day * d as f64;
        let weekend = date.weekday().number_from_monday() >= 6;
        let mut qty = if weekend {
            level * (1.0 + profile.weekend_lift)
        } else {
            level
        };
        if let Some(noise) = &noise {
            qty += noise.sample(&mut rng);
        }

        // Sales cannot be negative.
        history.push(SalesObservation::new(product_id, date, qty.max(0.0)));
    }
    history
}

/// Generates a "Step" pattern: `before_kg` for the first `step_day` days,
/// then `after_kg` for the rest. A drop models a product falling out of
/// favour.
pub fn generate_step_sales(
    product_id: &str,
    start: NaiveDate,
    days: usize,
    step_day: usize,
    before_kg: f64,
    after_kg: f64,
) -> Vec<SalesObservation> {
    (0..days)
        .map(|d| {
            let qty = if d < step_day { before_kg } else { after_kg };
            SalesObservation::new(product_id, start + Duration::days(d as i64), qty)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[test]
    fn constant_sales_are_contiguous() {
        let rows = generate_constant_sales("101", start(), 10, 5.0);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].datetime_id, 20250106);
        assert_eq!(rows[9].datetime_id, 20250115);
        assert!(rows.iter().all(|r| r.qty_sold_kg == 5.0));
    }

    #[test]
    fn seasonal_sales_are_reproducible_and_non_negative() {
        let profile = DemandProfile {
            noise_sd: 30.0,
            ..DemandProfile::default()
        };
        let a = generate_seasonal_sales("101", start(), 60, &profile, 7);
        let b = generate_seasonal_sales("101", start(), 60, &profile, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|r| r.qty_sold_kg >= 0.0));
    }

    #[test]
    fn weekend_lift_without_noise() {
        let profile = DemandProfile {
            noise_sd: 0.0,
            ..DemandProfile::default()
        };
        // 2025-01-06 is a Monday, so index 5 is Saturday.
        let rows = generate_seasonal_sales("101", start(), 7, &profile, 1);
        assert!((rows[0].qty_sold_kg - 20.0).abs() < 1e-9);
        assert!((rows[5].qty_sold_kg - 26.0).abs() < 1e-9);
    }

    #[test]
    fn step_pattern_switches_once() {
        let rows = generate_step_sales("101", start(), 8, 4, 4.0, 8.0);
        let qty: Vec<f64> = rows.iter().map(|r| r.qty_sold_kg).collect();
        assert_eq!(qty, vec![4.0, 4.0, 4.0, 4.0, 8.0, 8.0, 8.0, 8.0]);
    }
}
