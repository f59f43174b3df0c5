use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::ErrorCode;

/// The unified error type for a provisioning run
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Site error: {message}")]
    Site {
        code: u16,
        message: String,
        site_url: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Template error: {message}")]
    Template {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Provisioning engine error: {message}")]
    Engine {
        code: u16,
        message: String,
        command: Option<String>,
        exit_code: Option<i32>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Input error: {message}")]
    Input {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ProvisionError {
    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a site error with default code
    pub fn site(message: impl Into<String>) -> Self {
        Self::site_with_code(ErrorCode::SITE_GENERIC, message, None)
    }

    /// Create a site error with specific code and site URL
    pub fn site_with_code(code: u16, message: impl Into<String>, site_url: Option<String>) -> Self {
        Self::Site {
            code,
            message: message.into(),
            site_url,
            source: None,
        }
    }

    /// Create a template error with specific code and path
    pub fn template_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Template {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create an engine error with specific code
    pub fn engine_with_code(code: u16, message: impl Into<String>, command: Option<String>) -> Self {
        Self::Engine {
            code,
            message: message.into(),
            command,
            exit_code: None,
            source: None,
        }
    }

    /// Create an input error with specific code and field
    pub fn input_with_code(code: u16, message: impl Into<String>, field: Option<String>) -> Self {
        Self::Input {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Site { source: src, .. }
            | Self::Template { source: src, .. }
            | Self::Engine { source: src, .. }
            | Self::Input { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Set the exit code for an engine error
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        if let Self::Engine {
            exit_code: ref mut ec,
            ..
        } = self
        {
            *ec = Some(exit_code);
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Site { .. } => 3,
            Self::Template { .. } => 4,
            Self::Engine { .. } => 5,
            Self::Input { .. } => 6,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Site { code, .. }
            | Self::Template { code, .. }
            | Self::Engine { code, .. }
            | Self::Input { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Site {
                message, site_url, ..
            } => match site_url {
                Some(url) => format!("Site {} error: {}", url, message),
                None => format!("Site error: {}", message),
            },
            Self::Template { message, path, .. } => match path {
                Some(p) => format!("Template error at {}: {}", p.display(), message),
                None => format!("Template error: {}", message),
            },
            Self::Engine {
                message, command, ..
            } => match command {
                Some(cmd) => format!("Command '{}' failed: {}", cmd, message),
                None => format!("Provisioning engine error: {}", message),
            },
            Self::Input { message, field, .. } => match field {
                Some(f) => format!("Invalid input for '{}': {}", f, message),
                None => format!("Invalid input: {}", message),
            },
        }
    }
}

/// Result type used across the provisioner
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = ProvisionError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            "SPO_AppId is not set",
        );
        assert_eq!(
            err.to_string(),
            "[E1003] Configuration error: SPO_AppId is not set"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_source_and_user_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ProvisionError::template_with_code(
            ErrorCode::TEMPLATE_NOT_FOUND,
            "Template missing",
            Some(PathBuf::from("/tmp/Templates/x.json")),
        )
        .with_source(io);

        assert_eq!(err.code(), ErrorCode::TEMPLATE_NOT_FOUND);
        assert_eq!(err.to_string(), "[E3001] Template error: Template missing");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(
            err.user_message(),
            "Template error at /tmp/Templates/x.json: Template missing"
        );
    }

    #[test]
    fn test_engine_exit_code() {
        let err = ProvisionError::engine_with_code(
            ErrorCode::ENGINE_FAILED,
            "exited",
            Some("pwsh".to_string()),
        )
        .with_exit_code(3);

        match err {
            ProvisionError::Engine { exit_code, .. } => assert_eq!(exit_code, Some(3)),
            _ => unreachable!("Expected engine error"),
        }
    }
}
