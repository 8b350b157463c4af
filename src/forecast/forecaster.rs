// src/forecast/forecaster.rs

use crate::error::{PlannerError, PlannerResult};
use crate::forecast::traits::{DemandModel, FittedDemandModel, ForecastPoint, Observation};
use crate::io::sources::{InventorySource, SalesSource};
use serde::Serialize;
use tracing::debug;

/// Output of one forecast request: history plus horizon, and the horizon total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandForecast {
    pub sku: String,
    pub horizon_days: usize,
    /// Distinct historical days followed by the future days, ascending.
    pub points: Vec<ForecastPoint>,
    /// Sum of `yhat` over the last `horizon_days` points.
    pub total_over_horizon: f64,
}

impl DemandForecast {
    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.points.len() - self.horizon_days]
    }

    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.points.len() - self.horizon_days..]
    }
}

/// Fits `model` on the sales history of `sku` and projects `horizon_days`
/// days past the last observation.
///
/// # Arguments
/// * `sources` - Inventory (for SKU resolution) and sales history.
/// * `model` - The fitting capability.
/// * `sku` - Must match exactly one inventory row.
/// * `horizon_days` - Positive number of future days.
pub fn forecast_sku<S, M>(
    sources: &S,
    model: &M,
    sku: &str,
    horizon_days: usize,
) -> PlannerResult<DemandForecast>
where
    S: InventorySource + SalesSource,
    M: DemandModel,
{
    if horizon_days == 0 {
        return Err(PlannerError::invalid("horizon_days", "must be at least 1"));
    }

    // 1. Resolve the SKU to its sales join key
    let record = sources.find_sku(sku)?;

    // 2. Pull every observation for that product
    let sales = sources.sales_for_product(&record.product_id)?;
    debug!(sku, product_id = %record.product_id, rows = sales.len(), "selected sales history");

    // 3. (date, qty) is the whole training signal
    let history = sales
        .iter()
        .map(|obs| {
            obs.date()
                .map(|date| Observation {
                    date,
                    value: obs.qty_sold_kg,
                })
                .ok_or_else(|| {
                    PlannerError::data_source(
                        "sales",
                        format!("datetime_id {} is not a YYYYMMDD date", obs.datetime_id),
                    )
                })
        })
        .collect::<PlannerResult<Vec<_>>>()?;

    // 4. Fit
    let fitted = model.fit(&history).map_err(|e| PlannerError::Fitting {
        sku: sku.to_string(),
        observations: history.len(),
        reason: e.to_string(),
    })?;

    // 5. Predict over history plus the contiguous future
    let dates = fitted.extended_dates(horizon_days);
    let points = fitted.predict(&dates);

    // 6. Total over the future segment only
    let total_over_horizon: f64 = points[points.len() - horizon_days..]
        .iter()
        .map(|p| p.yhat)
        .sum();

    Ok(DemandForecast {
        sku: sku.to_string(),
        horizon_days,
        points,
        total_over_horizon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::additive::AdditiveSeasonalModel;
    use crate::io::demand::generate_constant_sales;
    use crate::io::sources::InMemorySources;
    use crate::model::records::{InventoryRecord, SalesObservation};
    use chrono::{Duration, NaiveDate};

    fn sources() -> InMemorySources {
        let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let mut sales = generate_constant_sales("101", start, 30, 12.0);
        sales.extend(generate_constant_sales("102", start, 30, 3.0));
        sales.push(SalesObservation {
            product_id: "103".to_string(),
            datetime_id: 20251101,
            qty_sold_kg: 1.0,
        });
        let record = |sku: &str, product_id: &str| InventoryRecord {
            sku: sku.to_string(),
            product_name: format!("Product {sku}"),
            product_id: product_id.to_string(),
            stock_on_hand_kg: 50.0,
            shelf_life_days: 3,
            cost_price: 1.0,
            list_price: 2.0,
        };
        InMemorySources::new(
            vec![
                record("VEG0001", "101"),
                record("VEG0002", "102"),
                record("VEG0003", "103"),
            ],
            sales,
        )
    }

    #[test]
    fn returns_history_plus_contiguous_horizon() {
        let result =
            forecast_sku(&sources(), &AdditiveSeasonalModel::default(), "VEG0001", 5).unwrap();
        assert_eq!(result.points.len(), 35);
        assert_eq!(result.history().len(), 30);
        let future = result.future();
        assert_eq!(future.len(), 5);
        assert!(future.iter().all(|p| p.is_future));
        for pair in result.points[29..].windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn total_is_sum_of_future_yhat() {
        let result =
            forecast_sku(&sources(), &AdditiveSeasonalModel::default(), "VEG0002", 7).unwrap();
        let expected: f64 = result.future().iter().map(|p| p.yhat).sum();
        assert_eq!(result.total_over_horizon, expected);
    }

    #[test]
    fn unknown_sku_is_not_found() {
        let err = forecast_sku(&sources(), &AdditiveSeasonalModel::default(), "NOPE", 7)
            .unwrap_err();
        assert_eq!(err.to_string(), "SKU NOPE not found in inventory");
    }

    #[test]
    fn single_observation_is_a_fitting_error() {
        let err = forecast_sku(&sources(), &AdditiveSeasonalModel::default(), "VEG0003", 7)
            .unwrap_err();
        match err {
            PlannerError::Fitting {
                sku, observations, ..
            } => {
                assert_eq!(sku, "VEG0003");
                assert_eq!(observations, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let err = forecast_sku(&sources(), &AdditiveSeasonalModel::default(), "VEG0001", 0)
            .unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidInput {
                param: "horizon_days",
                ..
            }
        ));
    }
}
