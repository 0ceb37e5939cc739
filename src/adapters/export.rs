use crate::domain::model::{
    GrowthReport, GrowthResult, Kpis, ManufacturerTotal, RowWarning, TrendPoint,
};
use crate::domain::period::Granularity;
use crate::utils::error::{ReportError, Result};
use crate::utils::format::{format_big_number, safe_pct};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const SUPPORTED_FORMATS: [&str; 3] = ["csv", "tsv", "json"];
pub const EXPORT_BASENAME: &str = "aggregated_vehicle_registrations";
pub const BUNDLE_NAME: &str = "registration_report.zip";

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    period: String,
    vehicle_category: &'a str,
    manufacturer: &'a str,
    total: f64,
    yoy_pct: Option<f64>,
    qoq_pct: Option<f64>,
}

impl<'a> From<&'a GrowthResult> for ExportRow<'a> {
    fn from(row: &'a GrowthResult) -> Self {
        Self {
            period: row.period.to_string(),
            vehicle_category: &row.category,
            manufacturer: &row.manufacturer,
            total: row.count,
            yoy_pct: row.yoy_growth,
            qoq_pct: row.qoq_growth,
        }
    }
}

/// Delimited text export; undefined growth becomes an empty cell.
pub fn write_delimited(rows: &[GrowthResult], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    if rows.is_empty() {
        writer.write_record([
            "period",
            "vehicle_category",
            "manufacturer",
            "total",
            "yoy_pct",
            "qoq_pct",
        ])?;
    }
    for row in rows {
        writer.serialize(ExportRow::from(row))?;
    }

    let bytes = writer.into_inner().map_err(|e| ReportError::ProcessingError {
        message: format!("failed to flush export: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| ReportError::ProcessingError {
        message: format!("export is not valid UTF-8: {}", e),
    })
}

/// Report summary plus rows in the same shape as the delimited exports.
#[derive(Serialize)]
struct JsonExport<'a> {
    granularity: Granularity,
    files: &'a [String],
    warnings: &'a [RowWarning],
    categories: &'a [String],
    manufacturers: &'a [String],
    kpis: &'a Kpis,
    top_manufacturers: &'a [ManufacturerTotal],
    trend: &'a [TrendPoint],
    rows: Vec<ExportRow<'a>>,
}

pub fn write_json(report: &GrowthReport) -> Result<String> {
    let export = JsonExport {
        granularity: report.granularity,
        files: &report.files,
        warnings: &report.warnings,
        categories: &report.categories,
        manufacturers: &report.manufacturers,
        kpis: &report.kpis,
        top_manufacturers: &report.top_manufacturers,
        trend: &report.trend,
        rows: report.rows.iter().map(ExportRow::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Renders one export format; `format` must be one of [`SUPPORTED_FORMATS`].
pub fn render_format(report: &GrowthReport, format: &str) -> Result<String> {
    match format {
        "csv" => write_delimited(&report.rows, b','),
        "tsv" => write_delimited(&report.rows, b'\t'),
        "json" => write_json(report),
        other => Err(ReportError::InvalidConfigValueError {
            field: "output_formats".to_string(),
            value: other.to_string(),
            reason: format!("Valid formats: {}", SUPPORTED_FORMATS.join(", ")),
        }),
    }
}

pub fn export_file_name(format: &str) -> String {
    format!("{}.{}", EXPORT_BASENAME, format)
}

/// Packs `(file name, contents)` pairs into an in-memory ZIP archive.
pub fn bundle(files: &[(String, String)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Plain-text report: KPIs, top manufacturers, trend, preview and provenance.
pub fn render_summary(report: &GrowthReport, preview_rows: usize) -> String {
    let mut out = String::new();
    let kpis = &report.kpis;

    let _ = writeln!(out, "Key performance indicators (selected filters)");
    let _ = writeln!(
        out,
        "  Total registrations (latest{}): {}",
        kpis.latest_period
            .map(|p| format!(" {}", p))
            .unwrap_or_default(),
        format_big_number(kpis.total_latest)
    );
    let _ = writeln!(out, "  YoY % (latest): {}", safe_pct(kpis.yoy_latest));
    let _ = writeln!(out, "  QoQ / PoP % (latest): {}", safe_pct(kpis.qoq_latest));

    let _ = writeln!(out);
    if report.top_manufacturers.is_empty() {
        let _ = writeln!(out, "No data for the latest period with current filters.");
    } else {
        let _ = writeln!(out, "Top manufacturers");
        for (rank, maker) in report.top_manufacturers.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:<32} {:>12}",
                rank + 1,
                maker.manufacturer,
                format_big_number(maker.total)
            );
        }
    }

    if !report.trend.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Manufacturer trend");
        for point in &report.trend {
            let _ = writeln!(
                out,
                "  {:<32} {:<8} {:>12}",
                point.manufacturer,
                point.period,
                format_big_number(point.total)
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Aggregated data (first {} of {} rows)",
        preview_rows.min(report.rows.len()),
        report.rows.len()
    );
    let _ = writeln!(
        out,
        "  {:<8} {:<8} {:<32} {:>12} {:>10} {:>10}",
        "period", "category", "manufacturer", "total", "yoy", "qoq"
    );
    for row in report.rows.iter().take(preview_rows) {
        let _ = writeln!(
            out,
            "  {:<8} {:<8} {:<32} {:>12} {:>10} {:>10}",
            row.period,
            row.category,
            row.manufacturer,
            row.count,
            safe_pct(row.yoy_growth),
            safe_pct(row.qoq_growth)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Data provenance");
    let _ = writeln!(out, "  Source files: {}", report.files.join(", "));
    let _ = writeln!(out, "  Granularity: {}", report.granularity);
    if !report.warnings.is_empty() {
        let _ = writeln!(out, "  Excluded rows: {}", report.warnings.len());
        for warning in &report.warnings {
            let _ = writeln!(out, "    {}:{} {}", warning.file, warning.line, warning.reason);
        }
    }
    let _ = writeln!(
        out,
        "  YoY compares with the same month, quarter or year one year earlier."
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::period::Period;

    fn sample_report() -> GrowthReport {
        let q1 = Period::quarter(2023, 1).unwrap();
        let q2 = Period::quarter(2023, 2).unwrap();
        GrowthReport {
            granularity: Granularity::Quarterly,
            files: vec!["maker 2023.csv".to_string()],
            warnings: vec![RowWarning {
                file: "maker 2023.csv".to_string(),
                line: 4,
                reason: "non-numeric registrations 'x'".to_string(),
            }],
            categories: vec!["4W".to_string()],
            manufacturers: vec!["A".to_string()],
            kpis: Kpis {
                latest_period: Some(q2),
                total_latest: 120.0,
                yoy_latest: None,
                qoq_latest: Some(20.0),
            },
            top_manufacturers: vec![],
            trend: vec![],
            rows: vec![
                GrowthResult {
                    period: q1,
                    category: "4W".to_string(),
                    manufacturer: "A".to_string(),
                    count: 100.0,
                    yoy_growth: None,
                    qoq_growth: None,
                },
                GrowthResult {
                    period: q2,
                    category: "4W".to_string(),
                    manufacturer: "A".to_string(),
                    count: 120.0,
                    yoy_growth: None,
                    qoq_growth: Some(20.0),
                },
            ],
        }
    }

    #[test]
    fn test_csv_leaves_undefined_growth_empty() {
        let csv = write_delimited(&sample_report().rows, b',').unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "period,vehicle_category,manufacturer,total,yoy_pct,qoq_pct");
        assert_eq!(lines[1], "2023-Q1,4W,A,100.0,,");
        assert_eq!(lines[2], "2023-Q2,4W,A,120.0,,20.0");
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let tsv = write_delimited(&[], b'\t').unwrap();
        assert_eq!(tsv.trim_end(), "period\tvehicle_category\tmanufacturer\ttotal\tyoy_pct\tqoq_pct");
    }

    #[test]
    fn test_json_uses_null_for_undefined() {
        let json = write_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let row = &value["rows"][1];
        assert!(value["rows"][0]["yoy_pct"].is_null());
        assert_eq!(row["qoq_pct"], 20.0);
        assert_eq!(row["period"], "2023-Q2");
        assert_eq!(row["vehicle_category"], "4W");
        assert_eq!(row["total"], 120.0);
        assert!(row.get("count").is_none());
        assert_eq!(value["kpis"]["total_latest"], 120.0);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(render_format(&sample_report(), "xlsx").is_err());
    }

    #[test]
    fn test_bundle_contains_files() {
        let files = vec![("a.csv".to_string(), "x".to_string())];
        let data = bundle(&files).unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_summary_mentions_na_and_exclusions() {
        let text = render_summary(&sample_report(), 10);
        assert!(text.contains("YoY % (latest): N/A"));
        assert!(text.contains("QoQ / PoP % (latest): 20.00%"));
        assert!(text.contains("Excluded rows: 1"));
        assert!(text.contains("No data for the latest period"));
    }
}
