// src/io/sources.rs

//! Tabular input sources.
//!
//! The core reads its two tables through the `InventorySource` and
//! `SalesSource` traits. `CsvSources` re-reads the files on every call;
//! `InMemorySources` serves owned tables and is used by the demo host and tests.

use crate::error::{PlannerError, PlannerResult};
use crate::model::records::{InventoryRecord, SalesObservation};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INVENTORY_COLUMNS: [&str; 7] = [
    "sku",
    "product_name",
    "product_id",
    "stock_on_hand_kg",
    "shelf_life_days",
    "cost_price",
    "list_price",
];

pub const SALES_COLUMNS: [&str; 3] = ["product_id", "datetime_id", "qty_sold_kg"];

/// Read access to the inventory snapshot.
pub trait InventorySource {
    fn load_inventory(&self) -> PlannerResult<Vec<InventoryRecord>>;

    /// Looks up the single record for `sku`. Exact match only.
    fn find_sku(&self, sku: &str) -> PlannerResult<InventoryRecord> {
        self.load_inventory()?
            .into_iter()
            .find(|record| record.sku == sku)
            .ok_or_else(|| PlannerError::NotFound(sku.to_string()))
    }
}

/// Read access to the daily sales history.
pub trait SalesSource {
    fn load_sales(&self) -> PlannerResult<Vec<SalesObservation>>;

    /// All observations for one product, in source order.
    fn sales_for_product(&self, product_id: &str) -> PlannerResult<Vec<SalesObservation>> {
        Ok(self
            .load_sales()?
            .into_iter()
            .filter(|obs| obs.product_id == product_id)
            .collect())
    }
}

// =========================================================================
// CSV parsing
// =========================================================================

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn check_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    required: &[&str],
    origin: &str,
) -> PlannerResult<()> {
    let headers = reader
        .headers()
        .map_err(|e| PlannerError::data_source(origin, e))?;
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PlannerError::data_source(
            origin,
            format!("missing required columns: {}", missing.join(", ")),
        ))
    }
}

/// Deserializes every row, keeping `keep`-matching ones. `validate` runs on
/// every row before the filter so malformed rows always surface.
fn read_rows<R, T, V, K>(
    reader: R,
    required: &[&str],
    origin: &str,
    validate: V,
    keep: K,
) -> PlannerResult<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
    V: Fn(&T) -> Result<(), String>,
    K: Fn(&T) -> bool,
{
    let mut csv_reader = csv_reader(reader);
    check_columns(&mut csv_reader, required, origin)?;

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let row: T = result.map_err(|e| {
            PlannerError::data_source(
                origin,
                format!("CSV parse error at line {}: {}", line_num + 2, e),
            )
        })?;
        validate(&row).map_err(|reason| {
            PlannerError::data_source(origin, format!("line {}: {}", line_num + 2, reason))
        })?;
        if keep(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Load the inventory table from a CSV reader.
pub fn read_inventory<R: Read>(reader: R, origin: &str) -> PlannerResult<Vec<InventoryRecord>> {
    let records: Vec<InventoryRecord> = read_rows(
        reader,
        &INVENTORY_COLUMNS,
        origin,
        InventoryRecord::validate,
        |_| true,
    )?;

    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.sku.as_str()) {
            return Err(PlannerError::data_source(
                origin,
                format!("duplicate sku {}", record.sku),
            ));
        }
    }
    Ok(records)
}

/// Load sales observations from a CSV reader, optionally keeping only one
/// product's rows.
pub fn read_sales<R: Read>(
    reader: R,
    origin: &str,
    product_id: Option<&str>,
) -> PlannerResult<Vec<SalesObservation>> {
    read_rows(
        reader,
        &SALES_COLUMNS,
        origin,
        validate_sales_row,
        |obs: &SalesObservation| product_id.map_or(true, |id| obs.product_id == id),
    )
}

fn validate_sales_row(obs: &SalesObservation) -> Result<(), String> {
    if obs.date().is_none() {
        return Err(format!("datetime_id {} is not a YYYYMMDD date", obs.datetime_id));
    }
    if !obs.qty_sold_kg.is_finite() || obs.qty_sold_kg < 0.0 {
        return Err(format!(
            "qty_sold_kg must be a non-negative number, got {}",
            obs.qty_sold_kg
        ));
    }
    Ok(())
}

fn open(path: &Path) -> PlannerResult<File> {
    File::open(path).map_err(|e| PlannerError::data_source(path.display().to_string(), e))
}

// =========================================================================
// CSV-backed sources
// =========================================================================

/// Two CSV files, re-read on every call.
#[derive(Debug, Clone)]
pub struct CsvSources {
    inventory_path: PathBuf,
    sales_path: PathBuf,
}

impl CsvSources {
    pub fn new(inventory_path: impl Into<PathBuf>, sales_path: impl Into<PathBuf>) -> Self {
        Self {
            inventory_path: inventory_path.into(),
            sales_path: sales_path.into(),
        }
    }

    pub fn inventory_path(&self) -> &Path {
        &self.inventory_path
    }

    pub fn sales_path(&self) -> &Path {
        &self.sales_path
    }
}

impl InventorySource for CsvSources {
    fn load_inventory(&self) -> PlannerResult<Vec<InventoryRecord>> {
        let origin = self.inventory_path.display().to_string();
        let records = read_inventory(open(&self.inventory_path)?, &origin)?;
        debug!(origin = %origin, rows = records.len(), "loaded inventory");
        Ok(records)
    }
}

impl SalesSource for CsvSources {
    fn load_sales(&self) -> PlannerResult<Vec<SalesObservation>> {
        let origin = self.sales_path.display().to_string();
        let rows = read_sales(open(&self.sales_path)?, &origin, None)?;
        debug!(origin = %origin, rows = rows.len(), "loaded sales history");
        Ok(rows)
    }

    fn sales_for_product(&self, product_id: &str) -> PlannerResult<Vec<SalesObservation>> {
        let origin = self.sales_path.display().to_string();
        let rows = read_sales(open(&self.sales_path)?, &origin, Some(product_id))?;
        debug!(origin = %origin, product_id, rows = rows.len(), "loaded product sales");
        Ok(rows)
    }
}

// =========================================================================
// In-memory sources
// =========================================================================

/// Owned tables served by clone.
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    pub inventory: Vec<InventoryRecord>,
    pub sales: Vec<SalesObservation>,
}

impl InMemorySources {
    pub fn new(inventory: Vec<InventoryRecord>, sales: Vec<SalesObservation>) -> Self {
        Self { inventory, sales }
    }
}

impl InventorySource for InMemorySources {
    fn load_inventory(&self) -> PlannerResult<Vec<InventoryRecord>> {
        Ok(self.inventory.clone())
    }
}

impl SalesSource for InMemorySources {
    fn load_sales(&self) -> PlannerResult<Vec<SalesObservation>> {
        Ok(self.sales.clone())
    }
}
