//! Result type alias for rewrite operations

use crate::error::OrigamiError;

/// Standard Result type for rewrite operations
pub type Result<T> = std::result::Result<T, OrigamiError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Convert an error to `None` if other documents may still proceed
    fn recoverable(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("recoverable error: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
