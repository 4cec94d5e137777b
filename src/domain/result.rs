//! Result type alias for medmask

use super::errors::MedmaskError;

/// Result type alias for medmask operations
///
/// # Examples
///
/// ```
/// use medmask::domain::result::Result;
/// use medmask::domain::errors::MedmaskError;
///
/// fn failing_function() -> Result<()> {
///     Err(MedmaskError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MedmaskError>;
