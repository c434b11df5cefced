//! Generator configuration.

use proc_macro2::TokenStream;
use quote::ToTokens;

use crate::errors::GeneratorError;

/// Default path of the runtime crate in generated code.
pub const DEFAULT_RUNTIME_CRATE: &str = "vmomi";

/// Default wire name of the service entry point.
pub const DEFAULT_ROOT_TYPE: &str = "ServiceInstance";

/// Default package name of the generated crate.
pub const DEFAULT_CRATE_NAME: &str = "vmomi-client";

/// Options controlling code generation.
///
/// ## Examples
///
/// ```
/// use vmomi_gen::config::GeneratorOptions;
///
/// let options = GeneratorOptions::default().with_runtime_crate("crate::runtime");
/// assert!(options.validate().is_ok());
///
/// let invalid = GeneratorOptions::default().with_runtime_crate("not a path");
/// assert!(invalid.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Rust path generated code uses to reach the runtime (e.g. `vmomi`).
    pub runtime_crate: String,
    /// Wire name of the type whose methods use a literal `_this` tag.
    pub root_type: String,
    /// Package name written to the generated `Cargo.toml`.
    pub crate_name: String,
    /// Filesystem path of the runtime crate for the generated `Cargo.toml`.
    pub runtime_path: Option<String>,
    /// Leave out inner attributes and module docs so the output can be
    /// pulled into another module with `include!`.
    pub embedded: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            root_type: DEFAULT_ROOT_TYPE.to_string(),
            crate_name: DEFAULT_CRATE_NAME.to_string(),
            runtime_path: None,
            embedded: false,
        }
    }
}

impl GeneratorOptions {
    pub fn with_runtime_crate(mut self, runtime_crate: impl Into<String>) -> Self {
        self.runtime_crate = runtime_crate.into();
        self
    }

    pub fn with_root_type(mut self, root_type: impl Into<String>) -> Self {
        self.root_type = root_type.into();
        self
    }

    pub fn with_crate_name(mut self, crate_name: impl Into<String>) -> Self {
        self.crate_name = crate_name.into();
        self
    }

    pub fn with_runtime_path(mut self, runtime_path: impl Into<String>) -> Self {
        self.runtime_path = Some(runtime_path.into());
        self
    }

    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    /// Checks the options before any code is generated.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if:
    /// - `runtime_crate` is not a valid Rust path
    /// - `root_type` is empty
    /// - `crate_name` is not a valid package name
    pub fn validate(&self) -> Result<(), GeneratorError> {
        self.runtime_tokens()?;

        if self.root_type.trim().is_empty() {
            return Err(GeneratorError::ConfigError(
                "root type must not be empty".to_string(),
            ));
        }

        let valid_name = !self.crate_name.is_empty()
            && self
                .crate_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && !self.crate_name.starts_with(|c: char| c.is_ascii_digit());
        if !valid_name {
            return Err(GeneratorError::ConfigError(format!(
                "invalid crate name '{}': use letters, digits, '-' and '_'",
                self.crate_name
            )));
        }

        Ok(())
    }

    /// The runtime path as tokens.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if `runtime_crate` does not parse
    /// as a Rust path.
    pub fn runtime_tokens(&self) -> Result<TokenStream, GeneratorError> {
        syn::parse_str::<syn::Path>(&self.runtime_crate)
            .map(|path| path.to_token_stream())
            .map_err(|e| {
                GeneratorError::ConfigError(format!(
                    "invalid runtime crate path '{}': {}",
                    self.runtime_crate, e
                ))
            })
    }

    /// Dependency name of the runtime crate: the first segment of its path.
    pub fn runtime_dependency(&self) -> &str {
        self.runtime_crate
            .trim_start_matches("::")
            .split("::")
            .next()
            .unwrap_or(DEFAULT_RUNTIME_CRATE)
    }
}
