use std::error::Error;

/// Base trait for all statusline errors
pub trait StatusError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error was caused by user input or configuration
    fn is_user_error(&self) -> bool {
        false
    }
}

impl StatusError for statusline_config::ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            statusline_config::ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            statusline_config::ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            statusline_config::ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            statusline_config::ConfigError::ConfigParseError { .. }
                | statusline_config::ConfigError::InvalidConfiguration { .. }
        )
    }
}

impl StatusError for statusline_paths::PathError {
    fn error_code(&self) -> &'static str {
        match self {
            statusline_paths::PathError::HomeNotFound => "HOME_NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_error() {
        let error = statusline_config::ConfigError::ConfigParseError {
            message: "invalid TOML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse config file: invalid TOML syntax"
        );
        assert_eq!(error.error_code(), "CONFIG_PARSE_ERROR");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_home_not_found_is_not_user_error() {
        let error = statusline_paths::PathError::HomeNotFound;
        assert_eq!(error.error_code(), "HOME_NOT_FOUND");
        assert!(!error.is_user_error());
    }
}
