//! Year-over-year and period-over-period growth per (category, manufacturer).

use crate::domain::model::{GrowthResult, RegistrationRecord};
use crate::domain::period::Period;
use std::collections::{BTreeMap, HashMap};

/// Percentage change from `prior` to `current`; undefined when `prior` is 0.
pub fn pct_change(current: f64, prior: f64) -> Option<f64> {
    if prior == 0.0 {
        return None;
    }
    let pct = (current - prior) / prior * 100.0;
    pct.is_finite().then_some(pct)
}

/// Stateless growth computation over a set of registration records.
pub struct GrowthCalculator;

impl GrowthCalculator {
    /// Emits one [`GrowthResult`] per input record, ordered by category,
    /// manufacturer and period.
    ///
    /// QoQ compares against the immediately preceding period of the same
    /// cadence and YoY against the same period a year earlier; both look
    /// only inside the record's own group. A missing comparison period or a
    /// zero count yields `None`.
    pub fn compute(records: &[RegistrationRecord]) -> Vec<GrowthResult> {
        // Counts per group and period; duplicate keys add up.
        let mut groups: HashMap<(&str, &str), BTreeMap<Period, f64>> = HashMap::new();
        for record in records {
            *groups
                .entry(record.group_key())
                .or_default()
                .entry(record.period)
                .or_insert(0.0) += record.count;
        }

        let mut ordered: Vec<&RegistrationRecord> = records.iter().collect();
        ordered.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.manufacturer.cmp(&b.manufacturer))
                .then_with(|| a.period.cmp(&b.period))
        });

        ordered
            .into_iter()
            .map(|record| {
                let series = &groups[&record.group_key()];
                let growth_from = |base: Option<Period>| {
                    series
                        .get(&base?)
                        .and_then(|&prior| pct_change(record.count, prior))
                };

                GrowthResult {
                    period: record.period,
                    category: record.category.clone(),
                    manufacturer: record.manufacturer.clone(),
                    count: record.count,
                    yoy_growth: growth_from(record.period.same_period_prior_year()),
                    qoq_growth: growth_from(record.period.previous()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(period: &str, category: &str, maker: &str, count: f64) -> RegistrationRecord {
        RegistrationRecord::new(Period::parse(period).unwrap(), category, maker, count)
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let value = actual.expect("growth should be defined");
        assert!(
            (value - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            value
        );
    }

    #[test]
    fn test_single_record_group_has_no_growth() {
        let results = GrowthCalculator::compute(&[rec("2023-Q1", "Car", "A", 100.0)]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].yoy_growth, None);
        assert_eq!(results[0].qoq_growth, None);
    }

    #[test]
    fn test_consecutive_periods_qoq() {
        let results = GrowthCalculator::compute(&[
            rec("2023-Q1", "Car", "A", 100.0),
            rec("2023-Q2", "Car", "A", 150.0),
        ]);
        assert_eq!(results[0].qoq_growth, None);
        assert_close(results[1].qoq_growth, 50.0);
    }

    #[test]
    fn test_zero_prior_is_undefined() {
        let results = GrowthCalculator::compute(&[
            rec("2023-Q1", "Car", "A", 0.0),
            rec("2023-Q2", "Car", "A", 80.0),
            rec("2024-Q1", "Car", "A", 10.0),
        ]);
        assert_eq!(results[1].qoq_growth, None);
        assert_eq!(results[2].yoy_growth, None);
    }

    #[test]
    fn test_end_to_end_example() {
        let results = GrowthCalculator::compute(&[
            rec("2024-Q1", "Car", "A", 150.0),
            rec("2023-Q1", "Car", "A", 100.0),
            rec("2023-Q2", "Car", "A", 120.0),
        ]);
        let labels: Vec<String> = results.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(labels, vec!["2023-Q1", "2023-Q2", "2024-Q1"]);

        assert_close(results[1].qoq_growth, 20.0);
        assert_eq!(results[1].yoy_growth, None);

        // 2023-Q4 is absent, so there is nothing to compare the quarter with.
        assert_eq!(results[2].qoq_growth, None);
        assert_close(results[2].yoy_growth, 50.0);
    }

    #[test]
    fn test_yoy_stays_inside_group() {
        let results = GrowthCalculator::compute(&[
            rec("2023-Q1", "Car", "A", 100.0),
            rec("2024-Q1", "Car", "B", 200.0),
            rec("2024-Q1", "Bike", "A", 300.0),
        ]);
        assert!(results.iter().all(|r| r.yoy_growth.is_none()));
    }

    #[test]
    fn test_monthly_yoy_uses_twelve_month_lag() {
        let results = GrowthCalculator::compute(&[
            rec("2023-03", "2W", "HERO", 200.0),
            rec("2024-02", "2W", "HERO", 250.0),
            rec("2024-03", "2W", "HERO", 150.0),
        ]);
        let march = &results[2];
        assert_close(march.yoy_growth, -25.0);
        assert_close(march.qoq_growth, -40.0);
        assert_eq!(results[1].yoy_growth, None);
    }

    #[test]
    fn test_yearly_series_qoq_matches_yoy() {
        let results = GrowthCalculator::compute(&[
            rec("2022", "4W", "TATA", 400.0),
            rec("2023", "4W", "TATA", 500.0),
        ]);
        assert_close(results[1].yoy_growth, 25.0);
        assert_eq!(results[1].yoy_growth, results[1].qoq_growth);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let records = vec![
            rec("2023-Q1", "Car", "A", 100.0),
            rec("2023-Q2", "Car", "A", 120.0),
            rec("2024-Q1", "Car", "A", 150.0),
            rec("2023-Q1", "Bike", "B", 40.0),
        ];
        assert_eq!(GrowthCalculator::compute(&records), GrowthCalculator::compute(&records));
    }

    #[test]
    fn test_duplicate_keys_sum_into_comparison_base() {
        let results = GrowthCalculator::compute(&[
            rec("2023-Q1", "Car", "A", 40.0),
            rec("2023-Q2", "Car", "A", 150.0),
            rec("2023-Q1", "Car", "A", 60.0),
        ]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].count, 40.0);
        assert_eq!(results[1].count, 60.0);
        assert_eq!(results[2].period.to_string(), "2023-Q2");
        assert_close(results[2].qoq_growth, 50.0);
    }

    #[test]
    fn test_first_calendar_year_has_no_base() {
        let results = GrowthCalculator::compute(&[rec("0001", "Car", "A", 10.0)]);
        assert_eq!(results[0].qoq_growth, None);
        assert_eq!(results[0].yoy_growth, None);
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(10.0, 0.0), None);
        assert_eq!(pct_change(0.0, 10.0), Some(-100.0));
    }
}
