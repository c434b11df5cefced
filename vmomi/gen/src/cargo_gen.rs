//! Cargo.toml generation for the output package.

use std::path::Path;

use crate::config::{DEFAULT_RUNTIME_CRATE, GeneratorOptions};
use crate::errors::GeneratorError;
use crate::output::write_atomic;

/// Version requirement used when the runtime is taken from a registry.
const RUNTIME_VERSION: &str = "0.1";

/// The runtime dependency line, if generated code needs one.
///
/// Paths rooted at `crate`, `self` or `super` point into the generated crate
/// itself and need no dependency.
fn runtime_dependency_line(options: &GeneratorOptions) -> Option<String> {
    let name = options.runtime_dependency();
    if matches!(name, "crate" | "self" | "super") {
        return None;
    }

    let mut spec = Vec::new();
    if name != DEFAULT_RUNTIME_CRATE {
        spec.push(format!("package = \"{}\"", DEFAULT_RUNTIME_CRATE));
    }
    match &options.runtime_path {
        Some(path) => spec.push(format!("path = \"{}\"", path.replace('\\', "/"))),
        None => spec.push(format!("version = \"{}\"", RUNTIME_VERSION)),
    }
    Some(format!("{} = {{ {} }}", name, spec.join(", ")))
}

/// Renders the generated package's Cargo.toml.
///
/// ## Examples
///
/// ```
/// use vmomi_gen::cargo_gen::render_cargo_toml;
/// use vmomi_gen::config::GeneratorOptions;
///
/// let toml = render_cargo_toml(&GeneratorOptions::default().with_runtime_path("../vmomi"));
/// assert!(toml.contains("name = \"vmomi-client\""));
/// assert!(toml.contains("vmomi = { path = \"../vmomi\" }"));
/// ```
pub fn render_cargo_toml(options: &GeneratorOptions) -> String {
    let runtime = runtime_dependency_line(options)
        .map(|line| format!("{}\n", line))
        .unwrap_or_default();

    format!(
        r#"# This file was automatically generated by vmomi-gen. Do not edit manually.

[package]
name = "{name}"
version = "0.1.0"
edition = "2024"
description = "Typed vmodl client generated by vmomi-gen"

[lib]
path = "src/lib.rs"

[dependencies]
{runtime}serde = {{ version = "1.0", features = ["derive"] }}
serde_json = "1.0"
strum = {{ version = "0.26", features = ["derive"] }}
"#,
        name = options.crate_name,
        runtime = runtime,
    )
}

/// Writes `Cargo.toml` into `package_dir`, or prints it with `dry_run`.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` if the options are invalid and
/// `GeneratorError::WriteError` if the file cannot be written.
pub fn write_cargo_toml(
    package_dir: &Path,
    options: &GeneratorOptions,
    dry_run: bool,
) -> Result<(), GeneratorError> {
    options.validate()?;
    let content = render_cargo_toml(options);

    if dry_run {
        println!("=== Cargo.toml ===\n{}\n", content);
        return Ok(());
    }
    write_atomic(&package_dir.join("Cargo.toml"), &content)
}
