// src/io/reporting.rs

use crate::forecast::forecaster::DemandForecast;
use crate::simulation::engine::SimulationResult;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Writes every forecast point (history and horizon) to a CSV file.
///
/// # Arguments
/// * `path` - Destination file (e.g., "reports/VEG0001_forecast.csv").
/// * `forecast` - Result of a forecast request.
pub fn write_forecast_log<P: AsRef<Path>>(path: P, forecast: &DemandForecast) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for point in &forecast.points {
        wtr.serialize(point)?;
    }

    // Flush the buffer to ensure all data is written
    wtr.flush()?;

    info!(
        rows = forecast.points.len(),
        path = %path.as_ref().display(),
        "exported forecast"
    );
    Ok(())
}

// The csv writer cannot flatten nested structs, so the row is spelled out.
#[derive(Serialize)]
struct SimulationRow<'a> {
    sku: &'a str,
    discount_rate: f64,
    current_stock: f64,
    days_to_expire: u32,
    base_waste_kg: f64,
    promo_waste_kg: f64,
    base_revenue: f64,
    promo_revenue: f64,
}

/// Writes one simulation result, keyed by SKU and discount, to a CSV file.
pub fn write_simulation_summary<P: AsRef<Path>>(
    path: P,
    sku: &str,
    discount_rate: f64,
    result: &SimulationResult,
) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    wtr.serialize(SimulationRow {
        sku,
        discount_rate,
        current_stock: result.current_stock,
        days_to_expire: result.days_to_expire,
        base_waste_kg: result.base_waste_kg,
        promo_waste_kg: result.promo_waste_kg,
        base_revenue: result.base_revenue,
        promo_revenue: result.promo_revenue,
    })?;
    wtr.flush()?;

    info!(path = %path.as_ref().display(), sku, "exported simulation");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::traits::ForecastPoint;
    use chrono::NaiveDate;

    #[test]
    fn forecast_log_has_one_row_per_point() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();
        let point = ForecastPoint {
            date,
            yhat: 10.0,
            yhat_lower: 8.0,
            yhat_upper: 12.0,
            trend: 9.5,
            weekly: 0.5,
            yearly: 0.0,
            is_future: true,
        };
        let forecast = DemandForecast {
            sku: "VEG0001".to_string(),
            horizon_days: 1,
            points: vec![point.clone(), point],
            total_over_horizon: 10.0,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        write_forecast_log(&path, &forecast).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,yhat,yhat_lower,yhat_upper,trend,weekly,yearly,is_future")
        );
        assert_eq!(lines.count(), 2);
        assert!(text.contains("2025-12-30,10.0,8.0,12.0"));
    }

    #[test]
    fn simulation_summary_is_one_keyed_row() {
        let result = SimulationResult {
            current_stock: 100.0,
            days_to_expire: 3,
            base_waste_kg: 20.0,
            promo_waste_kg: 0.0,
            base_revenue: 1_600_000.0,
            promo_revenue: 1_870_000.0,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulation.csv");
        write_simulation_summary(&path, "VEG0001", 0.25, &result).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "sku,discount_rate,current_stock,days_to_expire,base_waste_kg,promo_waste_kg,base_revenue,promo_revenue",
                "VEG0001,0.25,100.0,3,20.0,0.0,1600000.0,1870000.0",
            ]
        );
    }
}
