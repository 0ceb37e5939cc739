use crate::adapters::export::SUPPORTED_FORMATS;
use crate::adapters::loader::DEFAULT_FILE_PATTERN;
use crate::core::ConfigProvider;
use crate::core::selection::DEFAULT_TOP_N;
use crate::domain::filter::RecordFilter;
use crate::domain::period::Granularity;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportSection,
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub aggregate: AggregateConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub data_dir: String,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub manufacturers: Vec<String>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    /// Keep empty selections empty instead of applying defaults.
    pub include_all: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateConfig {
    pub granularity: Option<Granularity>,
    pub top_n: Option<usize>,
    #[serde(default)]
    pub trend_manufacturers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub bundle: Option<bool>,
    pub preview_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// `compact` (default) or `json`
    pub log_format: Option<String>,
}

fn default_file_pattern() -> String {
    DEFAULT_FILE_PATTERN.to_string()
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 檢查路徑中是否殘留未設定的 ${VAR}
    fn require_substituted(field: &str, value: &str) -> Result<()> {
        match ENV_VAR_RE.captures(value) {
            Some(caps) => {
                tracing::warn!("⚠️ Environment variable {} is not set", &caps[1]);
                Err(ReportError::MissingConfigError {
                    field: field.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    pub fn preview_rows(&self) -> usize {
        self.load.preview_rows.unwrap_or(20)
    }
}

impl ConfigProvider for TomlConfig {
    fn data_dir(&self) -> &str {
        &self.source.data_dir
    }

    fn file_pattern(&self) -> &str {
        &self.source.file_pattern
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn granularity(&self) -> Option<Granularity> {
        self.aggregate.granularity
    }

    fn filter(&self) -> RecordFilter {
        RecordFilter {
            categories: self.filter.categories.iter().cloned().collect(),
            manufacturers: self.filter.manufacturers.iter().cloned().collect(),
            since: self.filter.since,
            until: self.filter.until,
        }
    }

    fn apply_default_selection(&self) -> bool {
        !self.filter.include_all.unwrap_or(false)
    }

    fn top_n(&self) -> usize {
        self.aggregate.top_n.unwrap_or(DEFAULT_TOP_N)
    }

    fn trend_manufacturers(&self) -> &[String] {
        &self.aggregate.trend_manufacturers
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn bundle(&self) -> bool {
        self.load.bundle.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("report.name", &self.report.name)?;
        Self::require_substituted("source.data_dir", &self.source.data_dir)?;
        Self::require_substituted("load.output_path", &self.load.output_path)?;
        validation::validate_path("source.data_dir", &self.source.data_dir)?;
        validation::validate_non_empty_string("source.file_pattern", &self.source.file_pattern)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats(
            "load.output_formats",
            &self.load.output_formats,
            &SUPPORTED_FORMATS,
        )?;
        if let Some(top_n) = self.aggregate.top_n {
            validation::validate_positive_number("aggregate.top_n", top_n, 1)?;
        }
        validation::validate_date_window("filter.since/until", self.filter.since, self.filter.until)
    }
}
