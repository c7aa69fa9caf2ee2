//! # API Error Type
//!
//! What a failed command prints to stderr.
//!
//! ```text
//! CoreError ────┐
//! StorageError ─┼──► ApiError { code, message } ──► stderr, exit code 1
//! CartError ────┘
//! ```

use serde::Serialize;

use market_cart::CartError;
use market_core::CoreError;
use market_storage::StorageError;

/// Error document printed when a command fails.
///
/// ```json
/// { "code": "VALIDATION_ERROR", "message": "id is required" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad product descriptor or argument
    ValidationError,

    /// Storage could not be opened or written
    StorageError,

    /// Config file or environment is invalid
    ConfigError,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Storage error: {}", err);
        match err {
            StorageError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Cart storage could not be opened")
            }
            StorageError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Cart storage schema is out of date")
            }
            other => ApiError::new(ErrorCode::StorageError, other.to_string()),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Core(e) => e.into(),
            CartError::StorageRead(e) | CartError::StorageWrite(e) => e.into(),
            e if e.is_config_error() => ApiError::new(ErrorCode::ConfigError, e.to_string()),
            e => ApiError::internal(e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::ValidationError;

    #[test]
    fn test_error_codes() {
        let err: ApiError = CartError::Core(CoreError::Validation(ValidationError::Required {
            field: "id".into(),
        }))
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: ApiError = CartError::InvalidConfig("storage.key must not be empty".into()).into();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let err: ApiError = StorageError::ConnectionFailed("denied".into()).into();
        assert_eq!(err.code, ErrorCode::StorageError);

        let err: ApiError = CartError::ChannelClosed.into();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_json_shape() {
        let err = ApiError::validation("price must not be negative");
        assert_eq!(
            err.to_json(),
            r#"{"code":"VALIDATION_ERROR","message":"price must not be negative"}"#
        );
    }
}
