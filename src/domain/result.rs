//! Result type alias for Mercator
//!
//! This module provides a convenient Result type alias that uses MercatorError
//! as the error type.

use super::errors::MercatorError;

/// Result type alias for Mercator operations
///
/// This is a convenience type alias that uses `MercatorError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use mercator::domain::result::Result;
/// use mercator::domain::errors::MercatorError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(MercatorError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MercatorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::MercatorError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
        if let Ok(value) = result {
            assert_eq!(value, 42);
        }
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(MercatorError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
