use crate::domain::model::RegistrationRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Subset of records to report on. Empty category or manufacturer sets
/// select everything; `since`/`until` are inclusive and compared with the
/// start date of each record's period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub manufacturers: BTreeSet<String>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn matches(&self, record: &RegistrationRecord) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&record.category) {
            return false;
        }
        if !self.manufacturers.is_empty() && !self.manufacturers.contains(&record.manufacturer) {
            return false;
        }
        if self.since.is_none() && self.until.is_none() {
            return true;
        }
        let Some(start) = record.period.start_date() else {
            return false;
        };
        self.since.map_or(true, |since| start >= since)
            && self.until.map_or(true, |until| start <= until)
    }

    pub fn apply(&self, records: &[RegistrationRecord]) -> Vec<RegistrationRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::period::Period;

    fn record(period: &str, category: &str, maker: &str) -> RegistrationRecord {
        RegistrationRecord::new(Period::parse(period).unwrap(), category, maker, 10.0)
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let records = vec![record("2023", "2W", "HERO"), record("2024", "4W", "TATA")];
        assert_eq!(RecordFilter::default().apply(&records).len(), 2);
    }

    #[test]
    fn test_category_and_manufacturer_selection() {
        let records = vec![
            record("2023", "2W", "HERO"),
            record("2023", "4W", "TATA"),
            record("2023", "4W", "MARUTI"),
        ];
        let filter = RecordFilter {
            categories: ["4W".to_string()].into_iter().collect(),
            manufacturers: ["TATA".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let kept = filter.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].manufacturer, "TATA");
    }

    #[test]
    fn test_date_window_uses_period_start() {
        let records = vec![
            record("2022-Q4", "2W", "HERO"),
            record("2023-Q1", "2W", "HERO"),
            record("2023-Q3", "2W", "HERO"),
        ];
        let filter = RecordFilter {
            since: NaiveDate::from_ymd_opt(2023, 1, 1),
            until: NaiveDate::from_ymd_opt(2023, 6, 30),
            ..Default::default()
        };
        let kept = filter.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].period.to_string(), "2023-Q1");
    }
}
