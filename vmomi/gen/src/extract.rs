//! Schema extraction.
//!
//! The schema document is produced by an external command that dumps the
//! vmodl type tables as JSON. This is the only step that can fail the whole
//! run on account of the schema.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};
use vmomi_define::SchemaModel;

use crate::errors::GeneratorError;

/// Default extraction command.
pub const DEFAULT_EXTRACT_COMMAND: &str = "python -m generate";

/// An external command that writes a schema document to a path.
///
/// Run as `<program> <args...> <schema-path>`.
///
/// ## Examples
///
/// ```
/// use vmomi_gen::extract::SchemaExtractor;
///
/// let extractor = SchemaExtractor::from_command_line("python -m generate").unwrap();
/// assert_eq!(extractor.program, "python");
/// assert_eq!(extractor.args, vec!["-m", "generate"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaExtractor {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for SchemaExtractor {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["-m".to_string(), "generate".to_string()],
        }
    }
}

impl SchemaExtractor {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a command line on whitespace.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` for an empty command line.
    pub fn from_command_line(command: &str) -> Result<Self, GeneratorError> {
        let mut words = command.split_whitespace();
        let program = words.next().ok_or_else(|| {
            GeneratorError::ConfigError("extraction command must not be empty".to_string())
        })?;
        Ok(Self::new(program, words))
    }

    fn describe(&self, schema_path: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(schema_path.display().to_string());
        parts.join(" ")
    }

    /// Runs the command, writing the schema document to `schema_path`.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ExtractionFailed` if the command cannot be
    /// started, exits unsuccessfully or writes anything to stderr.
    pub fn run(&self, schema_path: &Path) -> Result<(), GeneratorError> {
        let command = self.describe(schema_path);
        debug!(%command, "running schema extraction");

        let failed = |reason: String| GeneratorError::ExtractionFailed {
            command: command.clone(),
            reason,
        };

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(schema_path)
            .output()
            .map_err(|e| failed(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let reason = if stderr.trim().is_empty() {
                output.status.to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(failed(reason));
        }
        if !stderr.trim().is_empty() {
            return Err(failed(stderr.trim().to_string()));
        }

        info!(path = %schema_path.display(), "schema extracted");
        Ok(())
    }

    /// Runs the command and loads the schema it wrote.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ExtractionFailed` if the command fails and
    /// `GeneratorError::Schema` if the resulting file cannot be loaded.
    pub fn extract_and_load(&self, schema_path: &Path) -> Result<SchemaModel, GeneratorError> {
        self.run(schema_path)?;
        Ok(SchemaModel::load(schema_path)?)
    }
}
