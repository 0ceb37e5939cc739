//! Calendar periods at monthly, quarterly or yearly cadence.
//!
//! A [`Period`] knows its immediate predecessor and the matching period one
//! year earlier, which is all the growth computation needs. Periods of
//! different cadence are ordered by their start date.

use crate::utils::error::{ReportError, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").unwrap());
static YEAR_QUARTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})\s*[-/ ]?\s*[Qq]([1-4])$").unwrap());
static QUARTER_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Qq]([1-4])\s*[-/ ]?\s*(\d{4})$").unwrap());
static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());

/// Calendar years a period may fall in.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Cadence of a period, ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[serde(alias = "month", alias = "m")]
    Monthly,
    #[serde(alias = "quarter", alias = "q")]
    Quarterly,
    #[serde(alias = "year", alias = "annual", alias = "y")]
    Yearly,
}

impl Granularity {
    /// Number of periods of this cadence in one year.
    pub const fn periods_per_year(&self) -> u32 {
        match self {
            Granularity::Monthly => 12,
            Granularity::Quarterly => 4,
            Granularity::Yearly => 1,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
            Granularity::Yearly => "yearly",
        }
    }

    const fn months(&self) -> u32 {
        12 / self.periods_per_year()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Granularity {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "month" | "monthly" => Ok(Granularity::Monthly),
            "q" | "quarter" | "quarterly" => Ok(Granularity::Quarterly),
            "y" | "year" | "yearly" | "annual" => Ok(Granularity::Yearly),
            other => Err(ReportError::InvalidConfigValueError {
                field: "granularity".to_string(),
                value: other.to_string(),
                reason: "Expected monthly, quarterly or yearly".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    year: i32,
    granularity: Granularity,
    /// Month (1..=12), quarter (1..=4) or 1 for yearly periods.
    index: u32,
}

fn check_year(year: i32, label: impl FnOnce() -> String) -> Result<i32> {
    if YEAR_RANGE.contains(&year) {
        Ok(year)
    } else {
        Err(ReportError::PeriodParseError { value: label() })
    }
}

impl Period {
    pub fn year(year: i32) -> Result<Self> {
        let year = check_year(year, || year.to_string())?;
        Ok(Self {
            year,
            granularity: Granularity::Yearly,
            index: 1,
        })
    }

    pub fn quarter(year: i32, quarter: u32) -> Result<Self> {
        let year = check_year(year, || format!("{}-Q{}", year, quarter))?;
        if !(1..=4).contains(&quarter) {
            return Err(ReportError::PeriodParseError {
                value: format!("{}-Q{}", year, quarter),
            });
        }
        Ok(Self {
            year,
            granularity: Granularity::Quarterly,
            index: quarter,
        })
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        let year = check_year(year, || format!("{}-{:02}", year, month))?;
        if !(1..=12).contains(&month) {
            return Err(ReportError::PeriodParseError {
                value: format!("{}-{:02}", year, month),
            });
        }
        Ok(Self {
            year,
            granularity: Granularity::Monthly,
            index: month,
        })
    }

    /// The period of the given cadence containing `date`.
    pub fn from_date(date: NaiveDate, granularity: Granularity) -> Result<Self> {
        let year = check_year(date.year(), || date.to_string())?;
        Ok(Self {
            year,
            granularity,
            index: (date.month() - 1) / granularity.months() + 1,
        })
    }

    pub fn parse(value: &str) -> Result<Self> {
        let s = value.trim();
        let parse_err = || ReportError::PeriodParseError {
            value: value.to_string(),
        };
        let year_of = |digits: &str| digits.parse::<i32>().map_err(|_| parse_err());
        let index_of = |digits: &str| digits.parse::<u32>().map_err(|_| parse_err());

        if let Some(caps) = YEAR_RE.captures(s) {
            return Self::year(year_of(&caps[1])?);
        }
        if let Some(caps) = YEAR_QUARTER_RE.captures(s) {
            return Self::quarter(year_of(&caps[1])?, index_of(&caps[2])?);
        }
        if let Some(caps) = QUARTER_YEAR_RE.captures(s) {
            return Self::quarter(year_of(&caps[2])?, index_of(&caps[1])?);
        }
        if let Some(caps) = YEAR_MONTH_RE.captures(s) {
            return Self::month(year_of(&caps[1])?, index_of(&caps[2])?).map_err(|_| parse_err());
        }

        // Full dates (optionally followed by a time) are floored to their month.
        let date_part = s.get(..10).unwrap_or(s);
        for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
                return Self::from_date(date, Granularity::Monthly);
            }
        }

        Err(parse_err())
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn calendar_year(&self) -> i32 {
        self.year
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The immediately preceding period of the same cadence; `None` before
    /// the first representable year.
    pub fn previous(&self) -> Option<Self> {
        if self.index > 1 {
            Some(Self {
                index: self.index - 1,
                ..*self
            })
        } else {
            Some(Self {
                index: self.granularity.periods_per_year(),
                ..self.same_period_prior_year()?
            })
        }
    }

    /// The same period one year earlier.
    pub fn same_period_prior_year(&self) -> Option<Self> {
        let year = self.year.checked_sub(1).filter(|y| YEAR_RANGE.contains(y))?;
        Some(Self { year, ..*self })
    }

    /// Rolls the period up to a coarser (or equal) cadence.
    pub fn to_granularity(&self, target: Granularity) -> Option<Self> {
        if target < self.granularity {
            return None;
        }
        let month = self.start_month();
        Some(Self {
            year: self.year,
            granularity: target,
            index: (month - 1) / target.months() + 1,
        })
    }

    fn start_month(&self) -> u32 {
        (self.index - 1) * self.granularity.months() + 1
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.start_month(), 1)
    }

    fn sort_key(&self) -> (i32, u32, Granularity) {
        (self.year, self.start_month(), self.granularity)
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.granularity {
            Granularity::Monthly => format!("{}-{:02}", self.year, self.index),
            Granularity::Quarterly => format!("{}-Q{}", self.year, self.index),
            Granularity::Yearly => self.year.to_string(),
        };
        f.pad(&label)
    }
}

impl FromStr for Period {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Period::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_shapes() {
        assert_eq!(Period::parse("2023").unwrap(), Period::year(2023).unwrap());
        assert_eq!(Period::parse("2023-Q2").unwrap(), Period::quarter(2023, 2).unwrap());
        assert_eq!(Period::parse("2023q4").unwrap(), Period::quarter(2023, 4).unwrap());
        assert_eq!(Period::parse("Q1 2024").unwrap(), Period::quarter(2024, 1).unwrap());
        assert_eq!(Period::parse("2023-03").unwrap(), Period::month(2023, 3).unwrap());
        assert_eq!(Period::parse("2023/11").unwrap(), Period::month(2023, 11).unwrap());
        assert_eq!(Period::parse("2023-03-15").unwrap(), Period::month(2023, 3).unwrap());
        assert_eq!(
            Period::parse("2023-01-01 00:00:00").unwrap(),
            Period::month(2023, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Period::parse("").is_err());
        assert!(Period::parse("2023-Q5").is_err());
        assert!(Period::parse("2023-13").is_err());
        assert!(Period::parse("last year").is_err());
        assert!(Period::parse("0000").is_err());
        assert!(Period::parse("0000-Q1").is_err());
    }

    #[test]
    fn test_previous_wraps_year() {
        let q1 = Period::quarter(2024, 1).unwrap();
        assert_eq!(q1.previous(), Some(Period::quarter(2023, 4).unwrap()));

        let jan = Period::month(2024, 1).unwrap();
        assert_eq!(jan.previous(), Some(Period::month(2023, 12).unwrap()));

        assert_eq!(Period::year(2024).unwrap().previous(), Some(Period::year(2023).unwrap()));
    }

    #[test]
    fn test_years_outside_calendar_range() {
        assert!(Period::year(0).is_err());
        assert!(Period::year(i32::MIN).is_err());
        assert!(Period::quarter(10_000, 1).is_err());
        assert!(Period::month(-5, 3).is_err());

        let first = Period::quarter(1, 1).unwrap();
        assert_eq!(first.previous(), None);
        assert_eq!(first.same_period_prior_year(), None);
        assert_eq!(
            Period::quarter(1, 2).unwrap().previous(),
            Some(Period::quarter(1, 1).unwrap())
        );
    }

    #[test]
    fn test_same_period_prior_year() {
        let q2 = Period::quarter(2024, 2).unwrap();
        assert_eq!(q2.same_period_prior_year(), Some(Period::quarter(2023, 2).unwrap()));
    }

    #[test]
    fn test_to_granularity() {
        let aug = Period::month(2023, 8).unwrap();
        assert_eq!(
            aug.to_granularity(Granularity::Quarterly),
            Some(Period::quarter(2023, 3).unwrap())
        );
        assert_eq!(aug.to_granularity(Granularity::Yearly), Some(Period::year(2023).unwrap()));
        assert_eq!(Period::year(2023).unwrap().to_granularity(Granularity::Monthly), None);
    }

    #[test]
    fn test_ordering_and_display() {
        let mut periods = vec![
            Period::quarter(2024, 1).unwrap(),
            Period::quarter(2023, 2).unwrap(),
            Period::quarter(2023, 1).unwrap(),
        ];
        periods.sort();
        let labels: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, vec!["2023-Q1", "2023-Q2", "2024-Q1"]);
        assert_eq!(Period::month(2023, 3).unwrap().to_string(), "2023-03");
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("Q".parse::<Granularity>().unwrap(), Granularity::Quarterly);
        assert_eq!("annual".parse::<Granularity>().unwrap(), Granularity::Yearly);
        assert!("weekly".parse::<Granularity>().is_err());
    }
}
