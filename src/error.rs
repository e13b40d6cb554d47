use thiserror::Error;

/// Application-level errors using thiserror for structured error handling.
///
/// These errors represent domain-specific failures that can occur during
/// application operation. They provide context and can be chained with anyhow.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to decode audio from {path}")]
    DecodeFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio playback failed")]
    PlaybackFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("No audio loaded for {0}")]
    NotLoaded(String),

    #[error("Could not open audio file: {0}")]
    Unreadable(String),

    #[error("Invalid sfxr slot: {0}")]
    InvalidSlot(usize),

    #[error("Failed to write WAV file to {path}")]
    ExportFailed {
        path: String,
        #[source]
        source: hound::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument for {command}: {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid value for {argument}: {value}")]
    InvalidValue {
        argument: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to initialize controller backend: {0}")]
    BackendInitFailed(String),
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = AudioError::InvalidSlot(9);
        assert_eq!(err.to_string(), "Invalid sfxr slot: 9");

        let err = CommandError::Unknown("dance".to_string());
        assert_eq!(err.to_string(), "Unknown command: dance");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/config.json"
        );
    }

    #[test]
    fn test_missing_argument_display() {
        let err = CommandError::MissingArgument {
            command: "seed",
            argument: "value",
        };
        assert_eq!(err.to_string(), "Missing argument for seed: value");
    }
}
