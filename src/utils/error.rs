use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("No files matching '{pattern}' found in {dir}")]
    NoInputFiles { dir: String, pattern: String },

    #[error("Cannot parse period '{value}'")]
    PeriodParseError { value: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Input,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::IoError(_) => ErrorCategory::Io,
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::CsvError(_)
            | ReportError::NoInputFiles { .. }
            | ReportError::PeriodParseError { .. } => ErrorCategory::Input,
            ReportError::ProcessingError { .. } | ReportError::ValidationError { .. } => {
                ErrorCategory::Processing
            }
            ReportError::ZipError(_) | ReportError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReportError::NoInputFiles { dir, pattern } => format!(
                "Place CSV exports named like '{}' into '{}' or pass --data-dir",
                pattern, dir
            ),
            ReportError::PeriodParseError { .. } => {
                "Use periods such as 2023, 2023-Q1, 2023-03 or 2023-03-01".to_string()
            }
            ReportError::InvalidConfigValueError { field, .. }
            | ReportError::ConfigValidationError { field, .. }
            | ReportError::MissingConfigError { field } => {
                format!("Check the '{}' setting and run again", field)
            }
            ReportError::ConfigError { .. } => {
                "Check the configuration file syntax".to_string()
            }
            ReportError::CsvError(_) => {
                "Make sure the input files are comma separated with a header row".to_string()
            }
            ReportError::IoError(_) => {
                "Check that the paths exist and are readable/writable".to_string()
            }
            ReportError::ZipError(_) | ReportError::SerializationError(_) => {
                "Retry without --bundle or with fewer output formats".to_string()
            }
            ReportError::ProcessingError { .. } | ReportError::ValidationError { .. } => {
                "Re-run with --verbose to see which records caused the problem".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("File system problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Input data problem: {}", self),
            ErrorCategory::Processing => format!("Report could not be computed: {}", self),
            ErrorCategory::Output => format!("Report could not be written: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = ReportError::NoInputFiles {
            dir: "data".to_string(),
            pattern: "maker *.csv".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("maker *.csv"));

        let err = ReportError::ProcessingError {
            message: "boom".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("boom"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: ReportError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
