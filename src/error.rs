use thiserror::Error;

/// Failures reading a schedule resource.
///
/// Every variant means "no data from this source"; resolvers turn it into
/// fallback-tier advancement instead of surfacing it to the user.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Schedule resource not found: {key}")]
    NotFound { key: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode schedule document: {0}")]
    Decode(String),

    #[error("Failed to read schedule file: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    pub fn not_found(year: i32, month: u32) -> Self {
        FeedError::NotFound {
            key: format!("{:04}{:02}", year, month),
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Date string that is not exactly eight digits forming a real date
    #[error("Invalid date format: {0:?} (expected YYYYMMDD)")]
    InvalidDateFormat(String),

    /// Field size outside the 2-18 runner range
    #[error("Field size must be between 2 and 18, got {0}")]
    InvalidFieldSize(u8),

    /// Venue or race not chosen before spinning
    #[error("No {0} selected")]
    MissingSelection(&'static str),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;

/// Validation functions
pub fn validate_field_size(total: u8) -> Result<()> {
    if !(crate::draw::MIN_FIELD..=crate::draw::MAX_FIELD).contains(&total) {
        return Err(ScheduleError::InvalidFieldSize(total));
    }
    Ok(())
}

pub fn validate_selection(venue: &str, race: &str) -> Result<()> {
    if venue.trim().is_empty() {
        return Err(ScheduleError::MissingSelection("venue"));
    }
    if race.trim().is_empty() {
        return Err(ScheduleError::MissingSelection("race"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_field_size_valid() {
        for total in 2..=18 {
            assert!(validate_field_size(total).is_ok());
        }
    }

    #[test]
    fn test_validate_field_size_invalid() {
        assert!(validate_field_size(0).is_err());
        assert!(validate_field_size(1).is_err());
        assert!(validate_field_size(19).is_err());
    }

    #[test]
    fn test_validate_selection() {
        assert!(validate_selection("東京", "11").is_ok());
        assert!(matches!(
            validate_selection("", "11"),
            Err(ScheduleError::MissingSelection("venue"))
        ));
        assert!(matches!(
            validate_selection("東京", "  "),
            Err(ScheduleError::MissingSelection("race"))
        ));
    }

    #[test]
    fn test_not_found_key_is_zero_padded() {
        let err = FeedError::not_found(2025, 4);
        assert!(err.to_string().contains("202504"));
    }

    #[test]
    fn test_error_display() {
        let err = ScheduleError::InvalidDateFormat("2025041".to_string());
        assert!(err.to_string().contains("Invalid date format"));
    }
}
