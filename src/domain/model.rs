use crate::domain::period::{Granularity, Period};
use serde::{Deserialize, Serialize};

/// One row of registration data for a (category, manufacturer, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub period: Period,
    pub category: String,
    pub manufacturer: String,
    pub count: f64,
}

impl RegistrationRecord {
    pub fn new(
        period: Period,
        category: impl Into<String>,
        manufacturer: impl Into<String>,
        count: f64,
    ) -> Self {
        Self {
            period,
            category: category.into(),
            manufacturer: manufacturer.into(),
            count,
        }
    }

    pub fn group_key(&self) -> (&str, &str) {
        (&self.category, &self.manufacturer)
    }
}

/// Growth metrics derived for one input record. `None` means undefined:
/// either no comparison period exists or its count is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthResult {
    pub period: Period,
    pub category: String,
    pub manufacturer: String,
    pub count: f64,
    pub yoy_growth: Option<f64>,
    pub qoq_growth: Option<f64>,
}

/// A row that the loader refused, kept for the provenance section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWarning {
    pub file: String,
    pub line: u64,
    pub reason: String,
}

/// Everything the loader produced from the data folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<RegistrationRecord>,
    pub files: Vec<String>,
    pub warnings: Vec<RowWarning>,
    pub granularity: Granularity,
}

/// Headline figures for the latest period of the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub latest_period: Option<Period>,
    pub total_latest: f64,
    pub yoy_latest: Option<f64>,
    pub qoq_latest: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerTotal {
    pub manufacturer: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub manufacturer: String,
    pub period: Period,
    pub total: f64,
}

/// The computed report handed to the output layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthReport {
    pub granularity: Granularity,
    pub files: Vec<String>,
    pub warnings: Vec<RowWarning>,
    pub categories: Vec<String>,
    pub manufacturers: Vec<String>,
    pub kpis: Kpis,
    pub top_manufacturers: Vec<ManufacturerTotal>,
    pub trend: Vec<TrendPoint>,
    pub rows: Vec<GrowthResult>,
}
