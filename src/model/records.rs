// src/model/records.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the inventory snapshot.
///
/// Expected CSV columns:
///   sku, product_name, product_id, stock_on_hand_kg, shelf_life_days,
///   cost_price, list_price
/// Any additional columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub sku: String,
    pub product_name: String,
    /// Join key into the sales history.
    pub product_id: String,
    pub stock_on_hand_kg: f64,
    /// Days left before spoilage, counted from the snapshot date.
    pub shelf_life_days: u32,
    pub cost_price: f64,
    /// Undiscounted unit sale price.
    pub list_price: f64,
}

impl InventoryRecord {
    /// Checks the non-negativity constraints a snapshot row must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.sku.trim().is_empty() {
            return Err("empty sku".to_string());
        }
        let amounts = [
            ("stock_on_hand_kg", self.stock_on_hand_kg),
            ("cost_price", self.cost_price),
            ("list_price", self.list_price),
        ];
        for (column, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "{} for SKU {} must be a non-negative number, got {}",
                    column, self.sku, value
                ));
            }
        }
        Ok(())
    }
}

/// One row of the daily sales history.
///
/// `(product_id, datetime_id)` is not unique: duplicate days are kept and
/// handed to the model as independent observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub product_id: String,
    /// Calendar day encoded as YYYYMMDD.
    pub datetime_id: u32,
    pub qty_sold_kg: f64,
}

impl SalesObservation {
    pub fn new(product_id: impl Into<String>, date: NaiveDate, qty_sold_kg: f64) -> Self {
        Self {
            product_id: product_id.into(),
            datetime_id: encode_datetime_id(date),
            qty_sold_kg,
        }
    }

    /// The calendar day of this observation, or `None` if `datetime_id` is
    /// not a valid YYYYMMDD date.
    pub fn date(&self) -> Option<NaiveDate> {
        decode_datetime_id(self.datetime_id)
    }
}

/// Decodes a YYYYMMDD integer (e.g. 20251230) into a calendar date.
pub fn decode_datetime_id(id: u32) -> Option<NaiveDate> {
    if !(10_000_000..=99_999_999).contains(&id) {
        return None;
    }
    let year = (id / 10_000) as i32;
    let month = (id / 100) % 100;
    let day = id % 100;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Encodes a calendar date as a YYYYMMDD integer.
pub fn encode_datetime_id(date: NaiveDate) -> u32 {
    use chrono::Datelike;
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}
