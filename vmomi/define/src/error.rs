//! Errors raised while loading a schema document.

use thiserror::Error;

/// Errors that can occur when reading a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("Failed to read schema file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The schema document is not valid JSON or does not match the model.
    #[error("Failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),
}
