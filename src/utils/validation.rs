use crate::utils::error::{SweepError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SweepError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SweepError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_existing_dir(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    if !Path::new(path).is_dir() {
        return Err(SweepError::OutputDirNotFound {
            path: path.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SweepError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(SweepError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| SweepError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SweepError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_dir", "results").is_ok());
        assert!(validate_path("output_dir", "").is_err());
        assert!(validate_path("output_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_existing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(validate_existing_dir("output_dir", dir.path().to_str().unwrap()).is_ok());

        let missing = dir.path().join("nope");
        let err = validate_existing_dir("output_dir", missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SweepError::OutputDirNotFound { .. }));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("id_width", 8, 8, 64).is_ok());
        assert!(validate_range("id_width", 4, 8, 64).is_err());
        assert!(validate_range("id_width", 65, 8, 64).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("cmd".to_string());
        assert_eq!(validate_required_field("base_command", &present).unwrap(), "cmd");
        let absent: Option<String> = None;
        assert!(validate_required_field("base_command", &absent).is_err());
    }
}
