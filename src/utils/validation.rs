use crate::utils::error::{ReportError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String], allowed: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed.iter().copied().collect();

    if formats.is_empty() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }

    for format in formats {
        if !allowed_set.contains(format.as_str()) {
            return Err(ReportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!("Unsupported format. Valid formats: {}", allowed.join(", ")),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_date_window<T: PartialOrd + std::fmt::Display>(
    field_name: &str,
    since: Option<T>,
    until: Option<T>,
) -> Result<()> {
    if let (Some(since), Some(until)) = (since, until) {
        if since > until {
            return Err(ReportError::ConfigValidationError {
                field: field_name.to_string(),
                message: format!("start {} is after end {}", since, until),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("top_n", 5, 1).is_ok());
        assert!(validate_positive_number("top_n", 0, 1).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["csv".to_string(), "json".to_string()];
        assert!(validate_output_formats("formats", &formats, &["csv", "tsv", "json"]).is_ok());

        let invalid = vec!["xlsx".to_string()];
        assert!(validate_output_formats("formats", &invalid, &["csv", "tsv", "json"]).is_err());
        assert!(validate_output_formats("formats", &[], &["csv"]).is_err());
    }

    #[test]
    fn test_validate_date_window() {
        assert!(validate_date_window("window", Some(2020), Some(2024)).is_ok());
        assert!(matches!(
            validate_date_window("window", Some(2024), Some(2020)),
            Err(ReportError::ConfigValidationError { .. })
        ));
        assert!(validate_date_window::<i32>("window", None, Some(2020)).is_ok());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("data_dir", "data").is_ok());
        assert!(validate_path("data_dir", "").is_err());
        assert!(validate_non_empty_string("file_pattern", "   ").is_err());
    }
}
