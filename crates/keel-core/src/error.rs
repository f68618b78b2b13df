//! Core error types for keel-core
//!
//! This module provides error types used throughout the keel admin panel
//! framework. Most interaction failures are deliberately silent (a stale
//! coordinate is a no-op, not an error), so these errors surface at the
//! boundaries: command parsing, tab lookup, rendering and transport delivery.

use thiserror::Error;

/// Core errors that can occur in the keel framework.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Tab with the specified identifier was not found.
    ///
    /// This occurs when unregistering or switching to a tab id that is
    /// not present in the registry.
    #[error("tab not found: {0}")]
    TabNotFound(String),

    /// A command string could not be parsed.
    ///
    /// The panel treats these as silent no-ops; the variant exists so the
    /// reason can be traced.
    #[error("malformed command '{line}': {reason}")]
    Command {
        /// The raw command line as received from the transport.
        line: String,
        /// Why the line was rejected.
        reason: String,
    },

    /// Building the widget tree failed.
    ///
    /// Raised when a provider callback panics during a draw.
    #[error("render failed: {0}")]
    Render(String),

    /// A host module failed to reload.
    #[error("module '{name}' failed: {reason}")]
    Module {
        /// Name the module reports.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// The transport collaborator could not deliver or destroy a tree.
    #[error("transport error: {0}")]
    Transport(String),

    /// Widget tree (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a [`CoreError::Module`] for the named module.
    pub fn module(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::Module {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`CoreError::Command`] for the given line and reason.
    pub fn command(line: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::Command {
            line: line.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
