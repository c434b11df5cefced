//! Error types for the vmodl generator.

use thiserror::Error;
use vmomi_define::SchemaError;

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to generate code
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The schema document could not be loaded
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The schema extraction command failed.
    ///
    /// This is the only fatal schema-related failure: without a schema file
    /// there is nothing to generate from.
    #[error("Schema extraction '{command}' failed: {reason}")]
    ExtractionFailed {
        /// The command line that was run.
        command: String,
        /// Exit status, stderr output or spawn error.
        reason: String,
    },
}
