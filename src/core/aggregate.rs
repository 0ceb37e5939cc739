use crate::domain::model::RegistrationRecord;
use crate::domain::period::{Granularity, Period};
use crate::utils::error::{ReportError, Result};
use std::collections::BTreeMap;

/// Sums registrations per (category, manufacturer, period) after rolling
/// every period up to `granularity`.
pub fn aggregate(
    records: &[RegistrationRecord],
    granularity: Granularity,
) -> Result<Vec<RegistrationRecord>> {
    let mut totals: BTreeMap<(&str, &str, Period), f64> = BTreeMap::new();

    for record in records {
        let period = record.period.to_granularity(granularity).ok_or_else(|| {
            ReportError::ProcessingError {
                message: format!(
                    "cannot split {} period {} into {} periods",
                    record.period.granularity(),
                    record.period,
                    granularity
                ),
            }
        })?;
        *totals
            .entry((record.category.as_str(), record.manufacturer.as_str(), period))
            .or_insert(0.0) += record.count;
    }

    tracing::debug!(
        "Aggregated {} records into {} {} rows",
        records.len(),
        totals.len(),
        granularity
    );

    Ok(totals
        .into_iter()
        .map(|((category, manufacturer, period), count)| {
            RegistrationRecord::new(period, category, manufacturer, count)
        })
        .collect())
}

/// The coarsest cadence present, which every record can be rolled up to.
pub fn detect_granularity(records: &[RegistrationRecord]) -> Granularity {
    records
        .iter()
        .map(|r| r.period.granularity())
        .max()
        .unwrap_or(Granularity::Yearly)
}

/// Total registrations per period across every group.
pub fn totals_by_period(records: &[RegistrationRecord]) -> BTreeMap<Period, f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.period).or_insert(0.0) += record.count;
    }
    totals
}
