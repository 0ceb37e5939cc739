use crate::adapters::export::{
    bundle, export_file_name, render_format, render_summary, BUNDLE_NAME,
};
use crate::adapters::loader::load_dataset;
use crate::core::aggregate::aggregate;
use crate::core::growth::GrowthCalculator;
use crate::core::insights::{
    compute_kpis, latest_period, manufacturer_trend, top_n_for_period, MAX_TREND_SERIES,
};
use crate::core::selection::resolve_filter;
use crate::core::{ConfigProvider, Dataset, GrowthReport, Pipeline, Storage};
use crate::utils::error::{ReportError, Result};
use std::path::Path;

pub const SUMMARY_FILE: &str = "registration_summary.txt";
const SUMMARY_PREVIEW_ROWS: usize = 500;

/// File names a run writes under the output path.
pub fn planned_outputs<C: ConfigProvider>(config: &C) -> Vec<String> {
    if config.bundle() {
        return vec![BUNDLE_NAME.to_string()];
    }
    config
        .output_formats()
        .iter()
        .map(|format| export_file_name(format))
        .chain(std::iter::once(SUMMARY_FILE.to_string()))
        .collect()
}

pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        tracing::debug!(
            "Reading '{}' from {}",
            self.config.file_pattern(),
            self.config.data_dir()
        );
        load_dataset(&self.storage, self.config.data_dir(), self.config.file_pattern()).await
    }

    async fn transform(&self, data: Dataset) -> Result<GrowthReport> {
        let granularity = self.config.granularity().unwrap_or(data.granularity);
        if granularity < data.granularity {
            return Err(ReportError::ValidationError {
                message: format!(
                    "data is {}, cannot report at {} granularity",
                    data.granularity, granularity
                ),
            });
        }

        let filter = resolve_filter(
            &data.records,
            &self.config.filter(),
            self.config.apply_default_selection(),
            self.config.top_n(),
        );
        let selected = filter.apply(&data.records);
        if selected.is_empty() {
            tracing::warn!("⚠️ No records match the current filters");
        }
        tracing::debug!(
            "{} of {} records selected",
            selected.len(),
            data.records.len()
        );

        let rows = aggregate(&selected, granularity)?;
        let kpis = compute_kpis(&rows);

        let top_manufacturers = latest_period(&rows)
            .map(|period| top_n_for_period(&rows, period, self.config.top_n()))
            .unwrap_or_default();

        let trend_makers: Vec<String> = if self.config.trend_manufacturers().is_empty() {
            top_manufacturers
                .iter()
                .take(MAX_TREND_SERIES)
                .map(|m| m.manufacturer.clone())
                .collect()
        } else {
            self.config.trend_manufacturers().to_vec()
        };
        let trend = manufacturer_trend(&rows, &trend_makers);

        let growth = GrowthCalculator::compute(&rows);

        Ok(GrowthReport {
            granularity,
            files: data.files,
            warnings: data.warnings,
            categories: filter.categories.into_iter().collect(),
            manufacturers: filter.manufacturers.into_iter().collect(),
            kpis,
            top_manufacturers,
            trend,
            rows: growth,
        })
    }

    async fn load(&self, report: &GrowthReport) -> Result<String> {
        let mut files = Vec::new();
        for format in self.config.output_formats() {
            files.push((export_file_name(format), render_format(report, format)?));
        }
        files.push((
            SUMMARY_FILE.to_string(),
            render_summary(report, SUMMARY_PREVIEW_ROWS),
        ));

        if self.config.bundle() {
            let zip_data = bundle(&files)?;
            tracing::debug!("Writing ZIP bundle ({} bytes)", zip_data.len());
            let path = self.output_file(BUNDLE_NAME);
            self.storage.write_file(&path, &zip_data).await?;
            return Ok(path);
        }

        for (name, content) in &files {
            let path = self.output_file(name);
            tracing::debug!("Writing {} ({} bytes)", path, content.len());
            self.storage.write_file(&path, content.as_bytes()).await?;
        }
        Ok(self.config.output_path().to_string())
    }
}
