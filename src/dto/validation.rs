//! Validation helpers for DTOs.

use validator::ValidationError;

/// Minimum number of candidate answers a question must offer.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of candidate answers a question may offer.
pub const MAX_OPTIONS: usize = 6;

/// Validates that a question offers between two and six candidate answers.
pub fn validate_option_count(options: &[String]) -> Result<(), ValidationError> {
    if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
        let mut err = ValidationError::new("option_count");
        err.message = Some(
            format!(
                "a question must offer between {MIN_OPTIONS} and {MAX_OPTIONS} options (got {})",
                options.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name is not blank once trimmed.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("blank_name");
        err.message = Some("name must not be blank".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_option_count_valid() {
        let options = vec!["a".to_string(), "b".to_string()];
        assert!(validate_option_count(&options).is_ok());

        let options: Vec<String> = (0..6).map(|i| i.to_string()).collect();
        assert!(validate_option_count(&options).is_ok());
    }

    #[test]
    fn test_validate_option_count_invalid() {
        assert!(validate_option_count(&[]).is_err());
        assert!(validate_option_count(&["only".to_string()]).is_err());

        let options: Vec<String> = (0..7).map(|i| i.to_string()).collect();
        assert!(validate_option_count(&options).is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Ada").is_ok());
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
    }
}
