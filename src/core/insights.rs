use crate::core::aggregate::totals_by_period;
use crate::core::growth::GrowthCalculator;
use crate::core::selection::rank_manufacturers;
use crate::domain::model::{Kpis, ManufacturerTotal, RegistrationRecord, TrendPoint};
use crate::domain::period::{Granularity, Period};
use std::collections::{BTreeMap, BTreeSet};

pub const MAX_TREND_SERIES: usize = 6;

const TOTAL_SERIES: &str = "ALL";

/// Latest-period total and its growth, computed on the series of totals
/// summed across every group. Monthly data reports QoQ on quarter totals.
pub fn compute_kpis(rows: &[RegistrationRecord]) -> Kpis {
    let totals = totals_by_period(rows);
    let monthly = totals
        .keys()
        .next_back()
        .is_some_and(|p| p.granularity() == Granularity::Monthly);

    let mut kpis = latest_growth(&totals);
    if monthly {
        let mut quarters: BTreeMap<Period, f64> = BTreeMap::new();
        for (period, total) in &totals {
            if let Some(quarter) = period.to_granularity(Granularity::Quarterly) {
                *quarters.entry(quarter).or_insert(0.0) += total;
            }
        }
        kpis.qoq_latest = latest_growth(&quarters).qoq_latest;
    }
    kpis
}

fn latest_growth(totals: &BTreeMap<Period, f64>) -> Kpis {
    let series: Vec<RegistrationRecord> = totals
        .iter()
        .map(|(period, total)| RegistrationRecord::new(*period, TOTAL_SERIES, TOTAL_SERIES, *total))
        .collect();

    match GrowthCalculator::compute(&series).pop() {
        Some(latest) => Kpis {
            latest_period: Some(latest.period),
            total_latest: latest.count,
            yoy_latest: latest.yoy_growth,
            qoq_latest: latest.qoq_growth,
        },
        None => Kpis {
            latest_period: None,
            total_latest: 0.0,
            yoy_latest: None,
            qoq_latest: None,
        },
    }
}

pub fn latest_period(rows: &[RegistrationRecord]) -> Option<Period> {
    rows.iter().map(|r| r.period).max()
}

/// Manufacturers ranked by registrations within one period.
pub fn top_n_for_period(
    rows: &[RegistrationRecord],
    period: Period,
    n: usize,
) -> Vec<ManufacturerTotal> {
    let mut ranked = rank_manufacturers(rows.iter().filter(|r| r.period == period));
    ranked.truncate(n);
    ranked
}

/// Per-manufacturer totals over time for at most [`MAX_TREND_SERIES`]
/// manufacturers, in the order they were requested.
pub fn manufacturer_trend(rows: &[RegistrationRecord], makers: &[String]) -> Vec<TrendPoint> {
    let mut seen = BTreeSet::new();
    let mut selected: Vec<&str> = makers
        .iter()
        .map(String::as_str)
        .filter(|m| seen.insert(*m))
        .collect();
    if selected.len() > MAX_TREND_SERIES {
        tracing::warn!(
            "⚠️ Trend limited to {} manufacturers, dropping {:?}",
            MAX_TREND_SERIES,
            &selected[MAX_TREND_SERIES..]
        );
        selected.truncate(MAX_TREND_SERIES);
    }

    selected
        .into_iter()
        .flat_map(|maker| {
            let mut series: BTreeMap<Period, f64> = BTreeMap::new();
            for row in rows.iter().filter(|r| r.manufacturer == maker) {
                *series.entry(row.period).or_insert(0.0) += row.count;
            }
            series.into_iter().map(move |(period, total)| TrendPoint {
                manufacturer: maker.to_string(),
                period,
                total,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(period: &str, category: &str, maker: &str, count: f64) -> RegistrationRecord {
        RegistrationRecord::new(Period::parse(period).unwrap(), category, maker, count)
    }

    #[test]
    fn test_kpis_on_totals() {
        let rows = vec![
            rec("2023-Q1", "2W", "HERO", 60.0),
            rec("2023-Q1", "4W", "TATA", 40.0),
            rec("2023-Q4", "2W", "HERO", 100.0),
            rec("2024-Q1", "2W", "HERO", 90.0),
            rec("2024-Q1", "4W", "TATA", 60.0),
        ];
        let kpis = compute_kpis(&rows);
        assert_eq!(kpis.latest_period, Some(Period::quarter(2024, 1).unwrap()));
        assert_eq!(kpis.total_latest, 150.0);
        assert_eq!(kpis.yoy_latest, Some(50.0));
        assert_eq!(kpis.qoq_latest, Some(50.0));
    }

    #[test]
    fn test_monthly_kpis_use_quarter_totals_for_qoq() {
        let rows: Vec<RegistrationRecord> = [
            ("2023-10", 100.0),
            ("2023-11", 100.0),
            ("2023-12", 100.0),
            ("2024-01", 200.0),
            ("2024-02", 200.0),
            ("2024-03", 100.0),
        ]
        .iter()
        .map(|(period, count)| rec(period, "2W", "HERO", *count))
        .collect();

        let kpis = compute_kpis(&rows);
        assert_eq!(kpis.latest_period, Some(Period::month(2024, 3).unwrap()));
        assert_eq!(kpis.total_latest, 100.0);
        let qoq = kpis.qoq_latest.unwrap();
        assert!((qoq - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_kpis_empty_selection() {
        let kpis = compute_kpis(&[]);
        assert_eq!(kpis.latest_period, None);
        assert_eq!(kpis.total_latest, 0.0);
        assert_eq!(kpis.yoy_latest, None);
    }

    #[test]
    fn test_top_n_for_period() {
        let rows = vec![
            rec("2024", "2W", "HERO", 5.0),
            rec("2024", "4W", "TATA", 9.0),
            rec("2024", "3W", "BAJAJ", 7.0),
            rec("2023", "2W", "HERO", 100.0),
        ];
        let top = top_n_for_period(&rows, Period::year(2024).unwrap(), 2);
        let names: Vec<&str> = top.iter().map(|m| m.manufacturer.as_str()).collect();
        assert_eq!(names, vec!["TATA", "BAJAJ"]);
        assert_eq!(latest_period(&rows), Some(Period::year(2024).unwrap()));
    }

    #[test]
    fn test_trend_is_capped() {
        let makers: Vec<String> = (1..=8).map(|i| format!("M{}", i)).collect();
        let rows: Vec<RegistrationRecord> = makers
            .iter()
            .map(|m| rec("2024", "2W", m, 1.0))
            .collect();
        let trend = manufacturer_trend(&rows, &makers);
        assert_eq!(trend.len(), MAX_TREND_SERIES);
        assert!(trend.iter().all(|p| p.manufacturer != "M7"));
    }

    #[test]
    fn test_trend_sums_categories() {
        let rows = vec![
            rec("2023", "2W", "HERO", 5.0),
            rec("2023", "3W", "HERO", 5.0),
            rec("2024", "2W", "HERO", 12.0),
        ];
        let trend = manufacturer_trend(&rows, &["HERO".to_string()]);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].total, 10.0);
        assert_eq!(trend[1].period, Period::year(2024).unwrap());
    }
}
