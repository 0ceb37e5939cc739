pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::filter::RecordFilter;
#[cfg(feature = "cli")]
use crate::domain::period::Granularity;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "registration-growth")]
#[command(about = "Vehicle registration growth report (YoY / QoQ) by category and manufacturer")]
pub struct CliConfig {
    /// Folder containing the manufacturer CSV exports
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// File name pattern of the exports (`*` and `?` wildcards)
    #[arg(long, default_value = crate::adapters::loader::DEFAULT_FILE_PATTERN)]
    pub file_pattern: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// monthly, quarterly or yearly; defaults to the granularity of the data
    #[arg(long)]
    pub granularity: Option<Granularity>,

    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub manufacturers: Vec<String>,

    /// Do not fall back to the default categories / top manufacturers
    #[arg(long)]
    pub all: bool,

    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    #[arg(long, default_value = "10")]
    pub top_n: usize,

    /// Manufacturers for the trend table (max 6)
    #[arg(long, value_delimiter = ',')]
    pub trend: Vec<String>,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub formats: Vec<String>,

    /// Pack all outputs into a single ZIP archive
    #[arg(long)]
    pub bundle: bool,

    #[arg(long, default_value = "20")]
    pub preview_rows: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn data_dir(&self) -> &str {
        &self.data_dir
    }

    fn file_pattern(&self) -> &str {
        &self.file_pattern
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn granularity(&self) -> Option<Granularity> {
        self.granularity
    }

    fn filter(&self) -> RecordFilter {
        RecordFilter {
            categories: self.categories.iter().cloned().collect(),
            manufacturers: self.manufacturers.iter().cloned().collect(),
            since: self.since,
            until: self.until,
        }
    }

    fn apply_default_selection(&self) -> bool {
        !self.all
    }

    fn top_n(&self) -> usize {
        self.top_n
    }

    fn trend_manufacturers(&self) -> &[String] {
        &self.trend
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn bundle(&self) -> bool {
        self.bundle
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("file_pattern", &self.file_pattern)?;
        validation::validate_positive_number("top_n", self.top_n, 1)?;
        validation::validate_output_formats(
            "formats",
            &self.formats,
            &crate::adapters::export::SUPPORTED_FORMATS,
        )?;
        validation::validate_date_window("since/until", self.since, self.until)
    }
}
