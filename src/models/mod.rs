use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Output columns, in the order they are written to CSV
pub const COLUMNS: [&str; 12] = [
    "url",
    "brand",
    "first_reg",
    "type",
    "body_type",
    "engine",
    "fuel",
    "mileage",
    "drive_type",
    "gearbox",
    "color",
    "price",
];

/// One scraped vehicle listing
///
/// Field order matches [`COLUMNS`]; serde relies on it when writing CSV rows.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CarRecord {
    pub url: String,
    pub brand: Option<String>,
    pub first_reg: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub body_type: Option<String>,
    pub engine: Option<String>,
    pub fuel: Option<String>,
    pub mileage: Option<String>,
    pub drive_type: Option<String>,
    pub gearbox: Option<String>,
    pub color: Option<String>,
    pub price: Option<String>,
}

impl CarRecord {
    /// All `(column, value)` pairs in column order
    pub fn fields(&self) -> [(&'static str, Option<&str>); 12] {
        [
            (COLUMNS[0], Some(self.url.as_str())),
            (COLUMNS[1], self.brand.as_deref()),
            (COLUMNS[2], self.first_reg.as_deref()),
            (COLUMNS[3], self.kind.as_deref()),
            (COLUMNS[4], self.body_type.as_deref()),
            (COLUMNS[5], self.engine.as_deref()),
            (COLUMNS[6], self.fuel.as_deref()),
            (COLUMNS[7], self.mileage.as_deref()),
            (COLUMNS[8], self.drive_type.as_deref()),
            (COLUMNS[9], self.gearbox.as_deref()),
            (COLUMNS[10], self.color.as_deref()),
            (COLUMNS[11], self.price.as_deref()),
        ]
    }
}

/// Totals reported once the pagination loop ends
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub pages: u32,
    pub cars: usize,
    /// Set once at least one batch reached disk
    pub output: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
