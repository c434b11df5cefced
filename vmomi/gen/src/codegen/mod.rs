//! Code generation modules for vmodl schemas.
//!
//! Each submodule emits one kind of item. All generators return
//! `proc_macro2::TokenStream`, which [`crate::output`] validates with `syn`
//! and formats with `prettyplease`.
//!
//! ## Submodules
//!
//! - [`prologue`] - Module docs, lint allowances and runtime re-exports
//! - [`enums`] - One Rust enum per enum type
//! - [`data_types`] - One struct per data type, embedding its parent
//! - [`managed_types`] - One struct per managed type with bound methods
//! - [`methods`] - Async methods and their argument structs
//! - [`descriptors`] - The `descriptor_registry()` function and `connect()`

pub mod data_types;
pub mod descriptors;
pub mod enums;
pub mod managed_types;
pub mod methods;
pub mod prologue;

use std::collections::HashSet;

use proc_macro2::TokenStream;
use tracing::warn;
use vmomi_define::{DataTypeDecl, EnumTypeDecl, ManagedTypeDecl, SchemaModel};

use crate::config::GeneratorOptions;
use crate::errors::GeneratorError;
use crate::index::TypeIndex;
use crate::naming::type_ident;
use crate::resolve::{ResolvedType, resolve_type};

pub use data_types::generate_data_type;
pub use descriptors::generate_descriptor_registry;
pub use enums::generate_enum;
pub use managed_types::generate_managed_type;
pub use methods::generate_method;
pub use prologue::generate_prologue;

/// Everything a generator needs besides the declaration itself.
#[derive(Debug)]
pub struct CodegenContext<'a> {
    pub index: &'a TypeIndex,
    pub options: &'a GeneratorOptions,
    /// Path of the runtime crate, as tokens.
    pub runtime: TokenStream,
}

impl<'a> CodegenContext<'a> {
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if the runtime path is invalid.
    pub fn new(index: &'a TypeIndex, options: &'a GeneratorOptions) -> Result<Self, GeneratorError> {
        Ok(Self {
            index,
            options,
            runtime: options.runtime_tokens()?,
        })
    }

    pub fn resolve(&self, wire_type: &str) -> ResolvedType {
        resolve_type(wire_type, self.index)
    }
}

/// The declarations that will be emitted, in schema order.
///
/// Declarations shadowed by a built-in or by an earlier declaration with the
/// same qualified name are left out, as are declarations whose Rust name is
/// already taken by an earlier type.
#[derive(Debug, Default)]
pub struct EmissionPlan<'s> {
    pub enums: Vec<&'s EnumTypeDecl>,
    pub data_types: Vec<&'s DataTypeDecl>,
    pub managed_types: Vec<&'s ManagedTypeDecl>,
}

impl<'s> EmissionPlan<'s> {
    pub fn new(schema: &'s SchemaModel, index: &TypeIndex) -> Self {
        let mut names = HashSet::new();
        let mut keep = |qualified: &str, wire_name: &str| {
            if !index.owns(qualified, wire_name) {
                return false;
            }
            let fresh = names.insert(type_ident(wire_name).to_string());
            if !fresh {
                warn!(qualified, wire_name, "type name already emitted, skipping");
            }
            fresh
        };

        let enums = schema
            .enum_types
            .iter()
            .filter(|decl| keep(&decl.qualified_name, &decl.wire_name))
            .collect();
        let data_types = schema
            .data_types
            .iter()
            .filter(|decl| keep(&decl.qualified_name, &decl.wire_name))
            .collect();
        let managed_types = schema
            .managed_types
            .iter()
            .filter(|decl| keep(&decl.qualified_name, &decl.wire_name))
            .collect();

        Self {
            enums,
            data_types,
            managed_types,
        }
    }
}
