//! Error types for mutation testing

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during mutation testing
#[derive(Debug, Error)]
pub enum MutationError {
    /// Source couldn't be parsed as Rust (file or standalone expression)
    #[error("Failed to parse '{file}' as Rust: {error}")]
    ParseError { file: String, error: String },

    /// Mutation text couldn't be located in the pristine source
    #[error("Failed to apply mutation: {reason}")]
    FailedToApply { reason: String },

    /// Failed to write mutated file
    #[error("Failed to write mutated file '{}': {error}", file.display())]
    WriteError { file: PathBuf, error: String },

    /// Failed to write the pristine content back. The file may be left mutated.
    #[error("Failed to restore original content of '{}': {error}", file.display())]
    RestoreError { file: PathBuf, error: String },

    /// The test command could not be executed at all
    #[error("Test command '{command}' could not be executed: {error}")]
    TestExecutionError { command: String, error: String },

    /// Include or exclude pattern is not a valid glob
    #[error("Invalid glob pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl MutationError {
    /// Whether the error aborts the run
    ///
    /// Everything else is recovered by skipping a file or a mutation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MutationError::RestoreError { .. } | MutationError::TestExecutionError { .. }
        )
    }
}

/// Result type for mutation operations
pub type Result<T> = std::result::Result<T, MutationError>;
