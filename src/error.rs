use thiserror::Error;

/// Main error type for the mood fusion engine
#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Failures raised by external scoring and embedding backends
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend '{backend}' failed: {reason}")]
    Failed { backend: String, reason: String },

    #[error("Backend '{backend}' returned a malformed response: {details}")]
    MalformedResponse { backend: String, details: String },

    #[error("All backends failed (tried: {}): {last}", .attempts.join(", "))]
    Exhausted { attempts: Vec<String>, last: String },

    #[error("No backend registered")]
    NoBackend,
}

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to write audio file: {path}")]
    WriteFailed { path: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Label set needs at least 2 labels, got {count}")]
    TooFewLabels { count: usize },

    #[error("Duplicate label name: {name}")]
    DuplicateLabel { name: String },

    #[error("No prototype or prior curve defined for label: {name}")]
    UnknownLabel { name: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using FusionError
pub type Result<T> = std::result::Result<T, FusionError>;

impl FusionError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried by the caller)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Backend(BackendError::Failed { .. }) => true,
            Self::Backend(BackendError::Exhausted { .. }) => true,
            Self::Audio(AudioError::LoadFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a WAV file.", path)
            }
            Self::Backend(BackendError::Exhausted { attempts, .. }) => {
                format!("Every scoring backend failed ({}). Try again later.", attempts.join(", "))
            }
            Self::Config(ConfigError::TooFewLabels { .. }) | Self::Config(ConfigError::DuplicateLabel { .. }) => {
                format!("The label list is invalid: {}", self)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failures_are_recoverable() {
        let err: FusionError = BackendError::Failed {
            backend: "clip".to_string(),
            reason: "timeout".to_string(),
        }
        .into();
        assert!(err.is_recoverable());

        let err: FusionError = ConfigError::TooFewLabels { count: 1 }.into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_exhausted_message_lists_attempts() {
        let err = BackendError::Exhausted {
            attempts: vec!["remote".to_string(), "local".to_string()],
            last: "boom".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("remote, local"));
        assert!(message.contains("boom"));
    }
}
