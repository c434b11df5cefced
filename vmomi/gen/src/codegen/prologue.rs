//! The fixed header of every generated file.

use proc_macro2::TokenStream;
use quote::quote;
use vmomi_define::SchemaModel;

use super::CodegenContext;

/// Version set listing the most recent API versions.
const NEWEST_SET: &str = "newest";

/// Generates the module docs, lint allowances and runtime re-exports.
///
/// Type names are the wire names, which are not always camel case, so the
/// file allows `non_camel_case_types`.
///
/// Embedded output keeps only the re-exports; the including module supplies
/// its own docs and lint allowances.
pub fn generate_prologue(schema: &SchemaModel, ctx: &CodegenContext<'_>) -> TokenStream {
    let runtime = &ctx.runtime;
    if ctx.options.embedded {
        return quote! {
            pub use #runtime::{Connection, VmomiError};
        };
    }

    let summary = format!(
        " {} enum types, {} data types and {} managed types.",
        schema.enum_types.len(),
        schema.data_types.len(),
        schema.managed_types.len()
    );
    let versions = schema
        .versions
        .iter()
        .map(|v| v.version.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let newest = schema
        .versions_in_set(NEWEST_SET)
        .map(|v| v.version.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let versions_doc = if versions.is_empty() {
        quote! {}
    } else {
        let line = format!(" API versions: {}.", versions);
        let newest_doc = if newest.is_empty() {
            quote! {}
        } else {
            let line = format!(" Newest: {}.", newest);
            quote! { #![doc = #line] }
        };
        quote! {
            //!
            #![doc = #line]
            #newest_doc
        }
    };

    quote! {
        //! Generated vmodl client types.
        //!
        #![doc = #summary]
        #versions_doc
        //!
        //! Use [`connect`] to bind a transport to the descriptor registry of
        //! this module, then reconstruct the service entry point from it.

        #![allow(non_camel_case_types)]

        pub use #runtime::{Connection, VmomiError};
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorOptions;
    use crate::index::TypeIndex;

    #[test]
    fn reexports_runtime_types() {
        let schema = SchemaModel::default();
        let index = TypeIndex::build(&schema);
        let options = GeneratorOptions::default().with_runtime_crate("crate::rt");
        let ctx = CodegenContext::new(&index, &options).unwrap();

        let code = generate_prologue(&schema, &ctx).to_string();
        assert!(code.contains("pub use crate :: rt :: { Connection , VmomiError }"));
        assert!(code.contains("non_camel_case_types"));
    }

    #[test]
    fn embedded_prologue_has_no_inner_attributes() {
        let schema = SchemaModel::default();
        let index = TypeIndex::build(&schema);
        let options = GeneratorOptions::default().with_embedded(true);
        let ctx = CodegenContext::new(&index, &options).unwrap();

        let code = generate_prologue(&schema, &ctx).to_string();
        assert!(!code.contains("# !"));
        assert!(code.contains("pub use vmomi :: { Connection , VmomiError }"));
    }

    #[test]
    fn documents_newest_versions() {
        let schema = SchemaModel::from_json(
            r#"{"versions": [
                {"version": "vim.version.v1", "flags": {}},
                {"version": "vim.version.v8", "flags": {"newest": true}}
            ]}"#,
        )
        .unwrap();
        let index = TypeIndex::build(&schema);
        let options = GeneratorOptions::default();
        let ctx = CodegenContext::new(&index, &options).unwrap();

        let code = generate_prologue(&schema, &ctx).to_string();
        assert!(code.contains("API versions: vim.version.v1, vim.version.v8."));
        assert!(code.contains("Newest: vim.version.v8."));
    }
}
