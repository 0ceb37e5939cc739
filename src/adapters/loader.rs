//! Reads manufacturer-wise registration exports (`maker 2023.csv`, ...) and
//! normalizes them into [`RegistrationRecord`]s.
//!
//! Header names vary between exports, so columns are looked up by a list
//! of aliases after trimming and lower-casing. Rows that cannot be turned
//! into a record are skipped and reported as [`RowWarning`]s.

use crate::core::aggregate::detect_granularity;
use crate::domain::model::{Dataset, RegistrationRecord, RowWarning};
use crate::domain::period::{Period, YEAR_RANGE};
use crate::domain::ports::Storage;
use crate::utils::error::{ReportError, Result};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

pub const DEFAULT_FILE_PATTERN: &str = "maker *.csv";

static YEAR_IN_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])((?:19|20)\d{2})(?:[^0-9]|$)").unwrap());

const MANUFACTURER_COLUMNS: &[&str] = &["manufacturer", "maker", "maker_name"];
const CATEGORY_COLUMNS: &[&str] = &["vehicle_category", "category", "vehicle_class", "vehicle_type"];
const COUNT_COLUMNS: &[&str] = &["registrations", "total", "count"];
const PERIOD_COLUMNS: &[&str] = &["period", "date"];
const YEAR_COLUMNS: &[&str] = &["year"];
const QUARTER_COLUMNS: &[&str] = &["quarter"];
const MONTH_COLUMNS: &[&str] = &["month"];

/// Case-insensitive file name matcher for `*`/`?` glob patterns.
pub fn pattern_matcher(pattern: &str) -> Result<Regex> {
    let body: String = pattern
        .chars()
        .map(|c| match c {
            '*' => ".*".to_string(),
            '?' => ".".to_string(),
            other => regex::escape(&other.to_string()),
        })
        .collect();

    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .build()
        .map_err(|e| ReportError::InvalidConfigValueError {
            field: "file_pattern".to_string(),
            value: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Maps free-form vehicle class labels onto `2W`, `3W`, `4W` or `OTHER`.
pub fn map_category(raw: &str) -> &'static str {
    let s = raw.to_lowercase();
    if s.contains("two") || s.contains("2w") {
        "2W"
    } else if s.contains("three") || s.contains("3w") || s.contains("auto") {
        "3W"
    } else if s.contains("four") || s.contains("4w") || s.contains("car") || s.contains("jeep") {
        "4W"
    } else {
        "OTHER"
    }
}

pub fn year_from_file_name(file_name: &str) -> Option<i32> {
    YEAR_IN_NAME_RE
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

struct Columns {
    manufacturer: Option<usize>,
    category: Option<usize>,
    count: Option<usize>,
    period: Option<usize>,
    year: Option<usize>,
    quarter: Option<usize>,
    month: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Self {
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| headers.iter().position(|h| h.as_str() == *alias))
        };
        Self {
            manufacturer: find(MANUFACTURER_COLUMNS),
            category: find(CATEGORY_COLUMNS),
            count: find(COUNT_COLUMNS),
            period: find(PERIOD_COLUMNS),
            year: find(YEAR_COLUMNS),
            quarter: find(QUARTER_COLUMNS),
            month: find(MONTH_COLUMNS),
        }
    }
}

fn cell<'r>(row: &'r csv::StringRecord, index: Option<usize>) -> Option<&'r str> {
    index
        .and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.parse::<i32>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|y| y.fract() == 0.0 && y.is_finite())
                .map(|y| y as i32)
        })
        .filter(|y| YEAR_RANGE.contains(y))
}

fn parse_quarter(raw: &str) -> Option<u32> {
    raw.trim_start_matches(['Q', 'q']).parse().ok()
}

fn parse_month(raw: &str) -> Option<u32> {
    raw.parse::<u32>()
        .ok()
        .or_else(|| raw.parse::<chrono::Month>().ok().map(|m| m.number_from_month()))
}

fn parse_count(raw: &str) -> std::result::Result<f64, String> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(v) => Err(format!("invalid registrations value {}", v)),
        Err(_) => Err(format!("non-numeric registrations '{}'", raw)),
    }
}

fn resolve_period(
    row: &csv::StringRecord,
    columns: &Columns,
    file_year: Option<i32>,
) -> std::result::Result<Period, String> {
    if let Some(raw) = cell(row, columns.period) {
        return Period::parse(raw).map_err(|e| e.to_string());
    }

    let year = match cell(row, columns.year) {
        Some(raw) => parse_year(raw).ok_or_else(|| format!("invalid year '{}'", raw))?,
        None => file_year.ok_or_else(|| "missing period".to_string())?,
    };

    if let Some(raw) = cell(row, columns.quarter) {
        let quarter = parse_quarter(raw).ok_or_else(|| format!("invalid quarter '{}'", raw))?;
        return Period::quarter(year, quarter).map_err(|e| e.to_string());
    }
    if let Some(raw) = cell(row, columns.month) {
        let month = parse_month(raw).ok_or_else(|| format!("invalid month '{}'", raw))?;
        return Period::month(year, month).map_err(|e| e.to_string());
    }
    Period::year(year).map_err(|e| e.to_string())
}

fn parse_row(
    row: &csv::StringRecord,
    columns: &Columns,
    file_year: Option<i32>,
) -> std::result::Result<RegistrationRecord, String> {
    let manufacturer =
        cell(row, columns.manufacturer).ok_or_else(|| "missing manufacturer".to_string())?;
    let count = match cell(row, columns.count) {
        Some(raw) => parse_count(raw)?,
        None => return Err("missing registrations".to_string()),
    };
    let period = resolve_period(row, columns, file_year)?;
    let category = cell(row, columns.category).map_or("OTHER", map_category);
    Ok(RegistrationRecord::new(period, category, manufacturer, count))
}

/// Parses one CSV export. Only structural CSV failures are errors; bad rows
/// become warnings.
pub fn parse_registrations(
    file_name: &str,
    data: &[u8],
) -> Result<(Vec<RegistrationRecord>, Vec<RowWarning>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let columns = Columns::resolve(&headers);
    let file_year = year_from_file_name(file_name);

    let mut records = Vec::new();
    let mut warnings = Vec::new();

    if columns.manufacturer.is_none() || columns.count.is_none() {
        tracing::warn!(
            "⚠️ {} has no manufacturer or registrations column (headers: {:?})",
            file_name,
            headers
        );
    }

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                warnings.push(RowWarning {
                    file: file_name.to_string(),
                    line,
                    reason: format!("unreadable row: {}", e),
                });
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let parsed = parse_row(&row, &columns, file_year);

        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::debug!("Skipping {}:{}: {}", file_name, line, reason);
                warnings.push(RowWarning {
                    file: file_name.to_string(),
                    line,
                    reason,
                });
            }
        }
    }

    if !warnings.is_empty() {
        tracing::warn!("⚠️ {}: excluded {} malformed rows", file_name, warnings.len());
    }
    tracing::debug!("{}: parsed {} records", file_name, records.len());

    Ok((records, warnings))
}

/// Loads every file under `dir` matching `pattern`.
pub async fn load_dataset<S: Storage>(storage: &S, dir: &str, pattern: &str) -> Result<Dataset> {
    let matcher = pattern_matcher(pattern)?;
    let files: Vec<String> = storage
        .list_files(dir)
        .await?
        .into_iter()
        .filter(|name| matcher.is_match(name))
        .collect();

    if files.is_empty() {
        return Err(ReportError::NoInputFiles {
            dir: dir.to_string(),
            pattern: pattern.to_string(),
        });
    }

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for file in &files {
        let path = std::path::Path::new(dir).join(file);
        let data = storage.read_file(&path.to_string_lossy()).await?;
        let (mut parsed, mut skipped) = parse_registrations(file, &data)?;
        records.append(&mut parsed);
        warnings.append(&mut skipped);
    }

    let granularity = detect_granularity(&records);
    tracing::info!(
        "📥 Loaded {} records from {} files ({} granularity, {} rows excluded)",
        records.len(),
        files.len(),
        granularity,
        warnings.len()
    );

    Ok(Dataset {
        records,
        files,
        warnings,
        granularity,
    })
}
