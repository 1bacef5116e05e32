use crate::utils::error::{ModelStoreError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ModelStoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ModelStoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ModelStoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(ModelStoreError::ConfigValidationError {
            field: field_name.to_string(),
            message: "List cannot be empty".to_string(),
        });
    }
    for value in values {
        validate_non_empty_string(field_name, value)?;
    }
    Ok(())
}

/// Identifiers are handed to external programs as single arguments.
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.chars().any(|c| c.is_whitespace()) {
        return Err(ModelStoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Identifier cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique(field_name: &str, values: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(ModelStoreError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.clone(),
                reason: "Duplicate entry".to_string(),
            });
        }
    }
    Ok(())
}

/// Every name in `requested` must appear in `available`.
pub fn validate_subset(field_name: &str, requested: &[String], available: &[String]) -> Result<()> {
    for name in requested {
        if !available.contains(name) {
            return Err(ModelStoreError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.clone(),
                reason: format!("Not configured. Available: {}", available.join(", ")),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("backends", "filesystem").is_ok());
        assert!(validate_identifier("backends", "").is_err());
        assert!(validate_identifier("backends", "file system").is_err());
    }

    #[test]
    fn test_validate_unique() {
        let values = vec!["aws".to_string(), "azure".to_string()];
        assert!(validate_unique("backends", &values).is_ok());

        let values = vec!["aws".to_string(), "aws".to_string()];
        assert!(validate_unique("backends", &values).is_err());
    }

    #[test]
    fn test_validate_subset() {
        let available = vec!["sklearn".to_string(), "xgboost".to_string()];
        assert!(validate_subset("frameworks", &["xgboost".to_string()], &available).is_ok());
        assert!(validate_subset("frameworks", &["keras".to_string()], &available).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("working_directory", ".").is_ok());
        assert!(validate_path("working_directory", "").is_err());
    }
}
