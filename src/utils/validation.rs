use crate::utils::error::{AnalysisError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Significance level must sit strictly between 0 and 1.
pub fn validate_alpha(field_name: &str, alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: alpha.to_string(),
            reason: "Significance level must be between 0 and 1 (exclusive)".to_string(),
        });
    }
    Ok(())
}

pub fn validate_input_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_output_formats(field_name: &str, formats: &[String], valid_formats: &[&str]) -> Result<()> {
    if formats.is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }

    for format in formats {
        if !valid_formats.contains(&format.as_str()) {
            return Err(AnalysisError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    valid_formats.join(", ")
                ),
            });
        }
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AnalysisError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_alpha() {
        assert!(validate_alpha("alpha", 0.05).is_ok());
        assert!(validate_alpha("alpha", 0.5).is_ok());
        assert!(validate_alpha("alpha", 0.0).is_err());
        assert!(validate_alpha("alpha", 1.0).is_err());
        assert!(validate_alpha("alpha", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_input_extension() {
        assert!(validate_input_extension("input", "data.csv", &["csv"]).is_ok());
        assert!(validate_input_extension("input", "DATA.CSV", &["csv"]).is_ok());
        assert!(validate_input_extension("input", "data.xlsx", &["csv"]).is_err());
        assert!(validate_input_extension("input", "data", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["markdown".to_string(), "json".to_string()];
        assert!(validate_output_formats("formats", &formats, &["markdown", "json", "csv"]).is_ok());

        let invalid = vec!["pdf".to_string()];
        assert!(validate_output_formats("formats", &invalid, &["markdown", "json", "csv"]).is_err());
        assert!(validate_output_formats("formats", &[], &["markdown"]).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let column: Option<String> = None;
        assert!(matches!(
            validate_required_field("dataset.landing_page_column", &column),
            Err(AnalysisError::MissingConfigError { .. })
        ));
        assert!(validate_non_empty_string("dataset.group_column", "  ").is_err());
    }
}
