use crate::domain::filter::RecordFilter;
use crate::domain::model::{ManufacturerTotal, RegistrationRecord};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

const PREFERRED_CATEGORIES: [&str; 3] = ["2W", "3W", "4W"];

pub const DEFAULT_TOP_N: usize = 10;

pub fn known_categories(records: &[RegistrationRecord]) -> BTreeSet<String> {
    records.iter().map(|r| r.category.clone()).collect()
}

pub fn known_manufacturers(records: &[RegistrationRecord]) -> BTreeSet<String> {
    records.iter().map(|r| r.manufacturer.clone()).collect()
}

/// `2W`/`3W`/`4W` when present, otherwise the first three categories.
pub fn default_categories(records: &[RegistrationRecord]) -> BTreeSet<String> {
    let known = known_categories(records);
    let preferred: BTreeSet<String> = PREFERRED_CATEGORIES
        .iter()
        .filter(|c| known.contains(**c))
        .map(|c| c.to_string())
        .collect();
    if preferred.is_empty() {
        known.into_iter().take(3).collect()
    } else {
        preferred
    }
}

/// Ranks manufacturers by total registrations, largest first, ties by name.
pub fn rank_manufacturers<'a, I>(records: I) -> Vec<ManufacturerTotal>
where
    I: IntoIterator<Item = &'a RegistrationRecord>,
{
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        *totals.entry(record.manufacturer.as_str()).or_insert(0.0) += record.count;
    }

    let mut ranked: Vec<ManufacturerTotal> = totals
        .into_iter()
        .map(|(manufacturer, total)| ManufacturerTotal {
            manufacturer: manufacturer.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.manufacturer.cmp(&b.manufacturer))
    });
    ranked
}

pub fn top_manufacturers(records: &[RegistrationRecord], n: usize) -> BTreeSet<String> {
    rank_manufacturers(records)
        .into_iter()
        .take(n)
        .map(|m| m.manufacturer)
        .collect()
}

/// Fills empty selections with the default categories and the top `top_n`
/// manufacturers when `use_defaults` is set. Requested values that the data
/// does not contain are kept (they match nothing) and logged.
pub fn resolve_filter(
    records: &[RegistrationRecord],
    requested: &RecordFilter,
    use_defaults: bool,
    top_n: usize,
) -> RecordFilter {
    warn_unknown("category", &requested.categories, &known_categories(records));
    warn_unknown(
        "manufacturer",
        &requested.manufacturers,
        &known_manufacturers(records),
    );
    let categories = requested.categories.clone();
    let manufacturers = requested.manufacturers.clone();

    let categories = if categories.is_empty() && use_defaults {
        default_categories(records)
    } else {
        categories
    };
    let manufacturers = if manufacturers.is_empty() && use_defaults {
        top_manufacturers(records, top_n)
    } else {
        manufacturers
    };

    tracing::debug!(
        "Selected categories {:?} and {} manufacturers",
        categories,
        manufacturers.len()
    );

    RecordFilter {
        categories,
        manufacturers,
        since: requested.since,
        until: requested.until,
    }
}

fn warn_unknown(kind: &str, requested: &BTreeSet<String>, known: &BTreeSet<String>) {
    for value in requested.difference(known) {
        tracing::warn!("⚠️ Unknown {} '{}' matches no records", kind, value);
    }
}
