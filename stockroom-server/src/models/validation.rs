//! Validation error types

use std::fmt;

/// Validation error for request bodies
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Field is missing or empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} is required", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ValidationError::Empty { field: "name" }.to_string(),
            "name is required"
        );
        assert_eq!(
            ValidationError::TooLong {
                field: "name",
                max: 255
            }
            .to_string(),
            "name exceeds maximum length of 255 characters"
        );
    }
}
