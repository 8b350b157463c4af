//! End-to-end tests: CSV files on disk -> InventoryPlanner -> results.

use chrono::{Duration, NaiveDate};
use perishable_planner::io::demand::{generate_seasonal_sales, DemandProfile};
use perishable_planner::{
    CsvSources, InventoryPlanner, PlannerError, SalesObservation, DEFAULT_HORIZON_DAYS,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const INVENTORY_CSV: &str = "\
sku,product_name,product_id,stock_on_hand_kg,shelf_life_days,cost_price,list_price,supplier
VEG0001,Tomato,101,100,3,12000,20000,Farm A
VEG0002,Lettuce,102,35,2,9000,15000,Farm B
FRU0001,Banana,201,240,5,15000,25000,Farm C
FRU0002,Mango,202,10,4,30000,45000,Farm C
";

fn write_sales(path: &Path, rows: &[SalesObservation]) {
    let mut wtr = csv::Writer::from_path(path).unwrap();
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
}

/// Inventory plus 120 days of history for the first three products; Mango
/// has a single sale.
fn fixture() -> (TempDir, CsvSources) {
    let dir = tempfile::tempdir().unwrap();
    let inventory = dir.path().join("current_inventory.csv");
    let sales = dir.path().join("daily_sales.csv");
    fs::write(&inventory, INVENTORY_CSV).unwrap();

    let start = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
    let mut rows = Vec::new();
    for (seed, (product_id, base_kg)) in [("101", 18.0), ("102", 6.0), ("201", 30.0)]
        .into_iter()
        .enumerate()
    {
        let profile = DemandProfile {
            base_kg,
            noise_sd: base_kg * 0.1,
            ..DemandProfile::default()
        };
        rows.extend(generate_seasonal_sales(
            product_id,
            start,
            120,
            &profile,
            seed as u64,
        ));
    }
    rows.push(SalesObservation::new("202", start, 2.0));
    write_sales(&sales, &rows);

    (dir, CsvSources::new(inventory, sales))
}

#[test]
fn every_sku_is_listed_once_and_resolves_back() {
    let (_dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);
    let catalog = planner.list_products().unwrap();

    let skus: Vec<&str> = catalog.iter().map(|(_, sku)| sku).collect();
    assert_eq!(skus, vec!["VEG0001", "VEG0002", "FRU0001", "FRU0002"]);
    for sku in skus {
        let name = catalog.product_name_for(sku).unwrap();
        assert_eq!(catalog.sku_for(name), Some(sku));
    }
}

#[test]
fn repeated_listing_is_identical() {
    let (_dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);
    assert_eq!(planner.list_products().unwrap(), planner.list_products().unwrap());
}

#[test]
fn forecast_covers_history_and_contiguous_horizon() {
    let (_dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);

    for horizon in [1, DEFAULT_HORIZON_DAYS, 30] {
        let forecast = planner.forecast("VEG0001", horizon).unwrap();
        assert_eq!(forecast.points.len(), 120 + horizon);

        let tail = &forecast.points[forecast.points.len() - horizon - 1..];
        for pair in tail.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }

        let expected: f64 = forecast.future().iter().map(|p| p.yhat).sum();
        assert_eq!(forecast.total_over_horizon, expected);
    }
}

#[test]
fn duplicate_days_count_once_in_the_output() {
    let (dir, sources) = fixture();
    // Append a second reading for an existing day.
    let mut rows: Vec<SalesObservation> = csv::Reader::from_path(sources.sales_path())
        .unwrap()
        .deserialize()
        .map(|r| r.unwrap())
        .collect();
    let first = rows[0].clone();
    rows.push(first);
    write_sales(&dir.path().join("daily_sales.csv"), &rows);

    let forecast = InventoryPlanner::new(sources)
        .forecast("VEG0001", 7)
        .unwrap();
    let distinct: HashSet<NaiveDate> = forecast.points.iter().map(|p| p.date).collect();
    assert_eq!(forecast.points.len(), 127);
    assert_eq!(distinct.len(), 127);
}

#[test]
fn forecast_stays_at_the_level_of_a_flat_history() {
    let (_dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);
    // Five weekdays at base plus a 30% weekend lift on two days.
    for (sku, base_kg) in [("VEG0001", 18.0), ("VEG0002", 6.0), ("FRU0001", 30.0)] {
        let forecast = planner.forecast(sku, 7).unwrap();
        let expected = base_kg * (5.0 + 2.0 * 1.3);
        let total = forecast.total_over_horizon;
        assert!(
            (total - expected).abs() <= 0.25 * expected,
            "{sku}: total {total:.2}, expected about {expected:.2}"
        );
        for point in forecast.future() {
            assert!(point.yhat > 0.5 * base_kg, "{sku}: {point:?}");
        }
    }
}

#[test]
fn forecast_is_stable_across_runs() {
    let (_dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);
    let a = planner.forecast("FRU0001", 7).unwrap();
    let b = planner.forecast("FRU0001", 7).unwrap();
    for (x, y) in a.points.iter().zip(&b.points) {
        let tolerance = 1e-6 * x.yhat.abs().max(1.0);
        assert!((x.yhat - y.yhat).abs() <= tolerance);
    }
    assert_eq!(a.total_over_horizon, b.total_over_horizon);
}

#[test]
fn forecast_feeds_simulation() {
    let (_dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);
    let forecast = planner.forecast("VEG0002", 7).unwrap();
    let result = planner
        .simulate("VEG0002", forecast.total_over_horizon, 0.2, 1.0)
        .unwrap();
    assert_eq!(result.current_stock, 35.0);
    assert_eq!(result.days_to_expire, 2);
    assert!(result.promo_waste_kg <= result.base_waste_kg);
}

#[test]
fn reference_simulation_scenario() {
    let (_dir, sources) = fixture();
    let result = InventoryPlanner::new(sources)
        .simulate("VEG0001", 80.0, 0.15, 1.0)
        .unwrap();
    assert!((result.base_waste_kg - 20.0).abs() < 1e-9);
    assert_eq!(result.promo_waste_kg, 0.0);
    assert!((result.base_revenue - 1_600_000.0).abs() < 1e-6);
    assert!((result.promo_revenue - 1_870_000.0).abs() < 1e-6);
}

#[test]
fn missing_sku_is_not_found_everywhere() {
    let (_dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);
    assert!(matches!(
        planner.forecast("NOPE", 7),
        Err(PlannerError::NotFound(sku)) if sku == "NOPE"
    ));
    assert!(matches!(
        planner.simulate("NOPE", 80.0, 0.15, 1.0),
        Err(PlannerError::NotFound(sku)) if sku == "NOPE"
    ));
}

#[test]
fn single_sale_reports_fitting_error_with_context() {
    let (_dir, sources) = fixture();
    let err = InventoryPlanner::new(sources)
        .forecast("FRU0002", 7)
        .unwrap_err();
    match err {
        PlannerError::Fitting {
            sku, observations, ..
        } => {
            assert_eq!(sku, "FRU0002");
            assert_eq!(observations, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_files_are_data_source_errors() {
    let dir = tempfile::tempdir().unwrap();
    let sources = CsvSources::new(dir.path().join("nope.csv"), dir.path().join("nope2.csv"));
    let planner = InventoryPlanner::new(sources);
    assert!(matches!(
        planner.list_products(),
        Err(PlannerError::DataSource { .. })
    ));
    assert!(matches!(
        planner.simulate("VEG0001", 1.0, 0.1, 1.0),
        Err(PlannerError::DataSource { .. })
    ));
}

#[test]
fn inventory_without_required_columns_is_rejected() {
    let (dir, sources) = fixture();
    fs::write(
        dir.path().join("current_inventory.csv"),
        "sku,product_name\nVEG0001,Tomato\n",
    )
    .unwrap();
    let err = InventoryPlanner::new(sources).list_products().unwrap_err();
    assert!(err.to_string().contains("missing required columns"));
}

#[test]
fn changes_on_disk_are_seen_by_the_next_call() {
    let (dir, sources) = fixture();
    let planner = InventoryPlanner::new(sources);
    assert_eq!(planner.list_products().unwrap().len(), 4);

    let trimmed: String = INVENTORY_CSV.lines().take(2).map(|l| format!("{l}\n")).collect();
    fs::write(dir.path().join("current_inventory.csv"), trimmed).unwrap();
    assert_eq!(planner.list_products().unwrap().len(), 1);
}
