// src/model/catalog.rs

use crate::model::records::InventoryRecord;
use serde::Serialize;

/// Ordered `product_name -> sku` mapping used to populate a product selector.
///
/// Entries keep the row order of the inventory table. When a product name
/// repeats, it keeps its first position and takes the SKU of the later row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductCatalog {
    entries: Vec<(String, String)>,
}

impl ProductCatalog {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        let mut catalog = Self::default();
        for record in records {
            catalog.insert(record.product_name.clone(), record.sku.clone());
        }
        catalog
    }

    fn insert(&mut self, product_name: String, sku: String) {
        match self.entries.iter_mut().find(|(name, _)| *name == product_name) {
            Some(entry) => entry.1 = sku,
            None => self.entries.push((product_name, sku)),
        }
    }

    /// SKU for a display name.
    pub fn sku_for(&self, product_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == product_name)
            .map(|(_, sku)| sku.as_str())
    }

    /// Display name for a SKU.
    pub fn product_name_for(&self, sku: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, s)| s == sku)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, sku)| (name.as_str(), sku.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
