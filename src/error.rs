pub use masterror::{AppError, AppResult};

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create error for an unknown SQL dialect name (fatal at startup)
pub fn unknown_dialect_error(name: &str, supported: &[&str]) -> AppError {
    AppError::bad_request(format!(
        "Unknown SQL dialect '{}'. Supported dialects: {}",
        name,
        supported.join(", ")
    ))
}

/// Create error for an invalid glob pattern
pub fn glob_pattern_error(pattern: &str, message: impl std::fmt::Display) -> AppError {
    AppError::bad_request(format!("Invalid glob pattern '{}': {}", pattern, message))
}
