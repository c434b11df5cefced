//! Output assembly and file writing for generated code.
//!
//! The generator produces a single module:
//! ```text
//! generated/src/
//! └── lib.rs         # Enums, data types, managed types, descriptor registry
//! ```
//!
//! Every piece is validated with `syn`, formatted with `prettyplease` and
//! written atomically (temp file + rename).

use std::fs;
use std::path::Path;

use proc_macro2::TokenStream;
use quote::quote;
use tracing::{debug, info};
use vmomi_define::SchemaModel;

use crate::codegen::{
    CodegenContext, EmissionPlan, generate_data_type, generate_descriptor_registry, generate_enum,
    generate_managed_type, generate_prologue,
};
use crate::config::GeneratorOptions;
use crate::errors::GeneratorError;
use crate::index::TypeIndex;

/// Assembles the complete module for a schema.
///
/// Order: prologue, enums, data types, managed types, descriptor registry.
/// The result depends only on the schema and the options.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` if the options are invalid.
pub fn assemble(schema: &SchemaModel, options: &GeneratorOptions) -> Result<TokenStream, GeneratorError> {
    options.validate()?;

    let index = TypeIndex::build(schema);
    let ctx = CodegenContext::new(&index, options)?;
    let plan = EmissionPlan::new(schema, &index);
    debug!(
        enums = plan.enums.len(),
        data_types = plan.data_types.len(),
        managed_types = plan.managed_types.len(),
        "assembling module"
    );

    let prologue = generate_prologue(schema, &ctx);
    let enums = plan.enums.iter().map(|decl| generate_enum(decl, &ctx));
    let data_types = plan.data_types.iter().map(|decl| generate_data_type(decl, &ctx));
    let managed_types = plan
        .managed_types
        .iter()
        .map(|decl| generate_managed_type(decl, &ctx));
    let registry = generate_descriptor_registry(&plan, &ctx);

    Ok(quote! {
        #prologue
        #(#enums)*
        #(#data_types)*
        #(#managed_types)*
        #registry
    })
}

/// Validates generated code using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats generated code using prettyplease, prepending the
/// auto-generated notice.
pub fn format_code(file: &syn::File) -> String {
    let formatted = prettyplease::unparse(file);
    format!(
        "// This code was automatically generated by vmomi-gen. Do not edit manually.\n\n{}",
        formatted
    )
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if:
/// - Parent directories cannot be created
/// - The temp file cannot be written
/// - The rename operation fails
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Generates the formatted module text for a schema.
///
/// ## Errors
///
/// Returns an error if the options are invalid or the generated code does not
/// parse.
pub fn generate_code(schema: &SchemaModel, options: &GeneratorOptions) -> Result<String, GeneratorError> {
    let tokens = assemble(schema, options)?;
    let file = validate_code(&tokens)?;
    Ok(format_code(&file))
}

/// Generates the module and writes it to `output_dir/lib.rs`.
///
/// With `dry_run`, the code is printed instead of written.
///
/// ## Returns
///
/// The formatted code.
///
/// ## Errors
///
/// Returns an error if:
/// - The options are invalid
/// - Code generation produces invalid Rust
/// - File writing fails
pub fn generate_and_write(
    schema: &SchemaModel,
    options: &GeneratorOptions,
    output_dir: &Path,
    dry_run: bool,
) -> Result<String, GeneratorError> {
    let code = generate_code(schema, options)?;

    if dry_run {
        println!("=== lib.rs ===\n{}\n", code);
    } else {
        let path = output_dir.join("lib.rs");
        write_atomic(&path, &code)?;
        info!(path = %path.display(), types = schema.type_count(), "wrote generated module");
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{contains_code, sample_schema};
    use tempfile::TempDir;

    // === assemble tests ===

    #[test]
    fn assemble_orders_sections() {
        let code = generate_code(&sample_schema(), &GeneratorOptions::default()).unwrap();

        let prologue = code.find("pub use vmomi::{Connection, VmomiError};").unwrap();
        let power_state = code.find("pub enum VirtualMachinePowerState").unwrap();
        let runtime_info = code.find("pub struct VirtualMachineRuntimeInfo").unwrap();
        let vm = code.find("pub struct VirtualMachine {").unwrap();
        let registry = code.find("pub fn descriptor_registry()").unwrap();

        assert!(prologue < power_state);
        assert!(power_state < runtime_info);
        assert!(runtime_info < vm);
        assert!(vm < registry);
    }

    #[test]
    fn assemble_rejects_invalid_options() {
        let options = GeneratorOptions::default().with_root_type("");
        let result = assemble(&sample_schema(), &options);

        assert!(matches!(result, Err(GeneratorError::ConfigError(_))));
    }

    #[test]
    fn generation_is_deterministic() {
        let schema = sample_schema();
        let options = GeneratorOptions::default();

        let first = generate_code(&schema, &options).unwrap();
        let second = generate_code(&schema, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn custom_runtime_path_is_used() {
        let options = GeneratorOptions::default().with_runtime_crate("crate::rt");
        let code = generate_code(&sample_schema(), &options).unwrap();

        assert!(contains_code(&code, "impl crate::rt::ManagedObjectType for VirtualMachine"));
        assert!(!contains_code(&code, "vmomi::"));
    }

    // === validate_code / format_code tests ===

    #[test]
    fn validate_code_accepts_valid_code() {
        let tokens = quote! {
            pub struct Handle;
        };
        assert!(validate_code(&tokens).is_ok());
    }

    #[test]
    fn validate_code_rejects_invalid_code() {
        let tokens = quote! { let x = };
        let err = validate_code(&tokens).unwrap_err();
        assert!(err.to_string().contains("Generated code is invalid"));
    }

    #[test]
    fn format_code_prepends_notice() {
        let file = validate_code(&quote! { pub struct Handle; }).unwrap();
        let code = format_code(&file);

        assert!(code.starts_with("// This code was automatically generated by vmomi-gen."));
        assert!(code.contains("pub struct Handle;"));
    }

    // === write_atomic tests ===

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("src").join("lib.rs");

        write_atomic(&path, "// content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "// content");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lib.rs");

        write_atomic(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    // === generate_and_write tests ===

    #[test]
    fn generate_and_write_writes_lib_rs() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("src");

        let code = generate_and_write(&sample_schema(), &GeneratorOptions::default(), &output_dir, false)
            .unwrap();

        let written = fs::read_to_string(output_dir.join("lib.rs")).unwrap();
        assert_eq!(written, code);
    }

    #[test]
    fn generate_and_write_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("src");

        let code = generate_and_write(&sample_schema(), &GeneratorOptions::default(), &output_dir, true)
            .unwrap();

        assert!(code.contains("pub fn connect("));
        assert!(!output_dir.exists());
    }
}
