use keel_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the panel service and its configuration.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("I/O error during '{operation}' on '{path:?}': {source}")]
    ConfigIo {
        operation: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config from '{path:?}': {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PanelError {
    pub fn io<P: Into<PathBuf>>(operation: &str, path: P, source: std::io::Error) -> Self {
        PanelError::ConfigIo {
            operation: operation.to_string(),
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using [`PanelError`].
pub type PanelResult<T> = Result<T, PanelError>;
