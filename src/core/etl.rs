use crate::core::{GrowthReport, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What a finished run produced.
#[derive(Debug)]
pub struct EtlOutcome {
    pub output_path: String,
    pub report: GrowthReport,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<EtlOutcome> {
        tracing::info!("Starting registration report...");
        self.monitor.log_stats("Start");

        tracing::info!("Extracting data...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} records from {} files",
            dataset.records.len(),
            dataset.files.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("Computing growth...");
        let report = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "Computed growth for {} rows ({} granularity)",
            report.rows.len(),
            report.granularity
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(EtlOutcome {
            output_path,
            report,
        })
    }
}
