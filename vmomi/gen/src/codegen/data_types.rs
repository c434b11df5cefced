//! Data type generation.
//!
//! A data type becomes a struct that embeds its parent as a flattened `base`
//! field and dereferences to it, so inherited fields read like own fields.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use tracing::warn;
use vmomi_define::{DataTypeDecl, FieldSpec, TypeKind};

use super::CodegenContext;
use crate::naming::{BASE_FIELD, IdentScope, field_ident, type_ident};
use crate::resolve::ResolvedType;

/// One field as it will be emitted.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub ident: Ident,
    pub wire_name: String,
    pub resolved: ResolvedType,
    pub optional: bool,
    /// Whether the value is a credential that must not appear in logs.
    pub secret: bool,
}

impl FieldPlan {
    /// Plans the fields of a declaration, keeping identifiers unique.
    pub fn plan_all(fields: &[FieldSpec], ctx: &CodegenContext<'_>) -> Vec<Self> {
        let mut scope = IdentScope::new();
        scope.reserve(BASE_FIELD);
        fields
            .iter()
            .map(|field| Self {
                ident: scope.claim(field_ident(&field.name)),
                wire_name: field.name.clone(),
                resolved: ctx.resolve(&field.wire_type),
                optional: field.is_optional(),
                secret: field.is_secret(),
            })
            .collect()
    }

    /// Storage type: `Option<T>` when optional (or `forced_optional`).
    pub fn rust_type(&self, runtime: &TokenStream, forced_optional: bool) -> TokenStream {
        let inner = self.resolved.rust_type(runtime, true);
        if self.optional || forced_optional {
            quote!(Option<#inner>)
        } else {
            inner
        }
    }
}

/// The resolved parent of a declaration, if it has a usable one.
pub(crate) struct ParentPlan {
    /// Rust path of the parent type.
    pub path: TokenStream,
    /// Parent wire name, as registered in the descriptor registry.
    pub wire_name: String,
}

/// Resolves a data type's parent.
///
/// A missing parent means the type is a root; a parent that does not resolve
/// to a data type is dropped with a warning.
pub(crate) fn data_parent(decl: &DataTypeDecl, ctx: &CodegenContext<'_>) -> Option<ParentPlan> {
    let parent = decl.parent_qualified_name.as_deref()?;
    match ctx.resolve(parent) {
        resolved @ ResolvedType::Declared {
            kind: TypeKind::Data,
            ..
        } => Some(ParentPlan {
            path: resolved.rust_type(&ctx.runtime, false),
            wire_name: resolved.type_key(),
        }),
        _ => {
            warn!(
                type_name = %decl.wire_name,
                parent,
                "data type parent does not resolve to a data type, emitting without a base"
            );
            None
        }
    }
}

/// Generates the struct and trait impls for a data type.
///
/// ## Examples
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, serde::Serialize)]
/// pub struct AboutInfo {
///     #[serde(flatten)]
///     pub base: vmomi::DynamicData,
///     #[serde(rename = "fullName")]
///     pub full_name: String,
///     #[serde(rename = "build", skip_serializing_if = "Option::is_none")]
///     pub build: Option<String>,
/// }
///
/// impl vmomi::DataObjectType for AboutInfo { /* ... */ }
/// impl vmomi::FromDecoded for AboutInfo { /* ... */ }
/// ```
pub fn generate_data_type(decl: &DataTypeDecl, ctx: &CodegenContext<'_>) -> TokenStream {
    let runtime = &ctx.runtime;
    let ident = type_ident(&decl.wire_name);
    let wire_name = &decl.wire_name;
    let doc = format!(" `{}` (`{}`).", decl.qualified_name, decl.wire_name);

    let parent = data_parent(decl, ctx);
    let fields = FieldPlan::plan_all(&decl.fields, ctx);

    let field_decls = fields.iter().map(|field| {
        let field_ident = &field.ident;
        let field_wire = &field.wire_name;
        let ty = field.rust_type(runtime, false);
        if field.optional {
            quote! {
                #[serde(rename = #field_wire, skip_serializing_if = "Option::is_none")]
                pub #field_ident: #ty,
            }
        } else {
            quote! {
                #[serde(rename = #field_wire)]
                pub #field_ident: #ty,
            }
        }
    });

    let field_inits = fields.iter().map(|field| {
        let field_ident = &field.ident;
        let field_wire = &field.wire_name;
        quote! { #field_ident: object.take(connection, #field_wire)?, }
    });

    let (base_decl, base_init, deref_impls) = match &parent {
        Some(parent) => {
            let path = &parent.path;
            (
                quote! {
                    #[serde(flatten)]
                    pub base: #path,
                },
                quote! {
                    base: <#path as #runtime::DataObjectType>::from_object(connection, object)?,
                },
                deref_impls(&ident, path),
            )
        }
        None => (quote! {}, quote! {}, quote! {}),
    };

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq, serde::Serialize)]
        pub struct #ident {
            #base_decl
            #(#field_decls)*
        }

        #deref_impls

        impl #runtime::DataObjectType for #ident {
            const WIRE_TYPE: &'static str = #wire_name;

            #[allow(unused_variables)]
            fn from_object(
                connection: &#runtime::Connection,
                object: &mut #runtime::DecodedObject,
            ) -> Result<Self, #runtime::VmomiError> {
                Ok(Self {
                    #base_init
                    #(#field_inits)*
                })
            }
        }

        impl #runtime::FromDecoded for #ident {
            fn from_decoded(
                connection: &#runtime::Connection,
                value: #runtime::Decoded,
            ) -> Result<Self, #runtime::VmomiError> {
                #runtime::construct_data(connection, value)
            }
        }
    }
}

/// `Deref`/`DerefMut` from a struct to its embedded `base`.
pub(crate) fn deref_impls(ident: &Ident, parent: &TokenStream) -> TokenStream {
    quote! {
        impl std::ops::Deref for #ident {
            type Target = #parent;

            fn deref(&self) -> &Self::Target {
                &self.base
            }
        }

        impl std::ops::DerefMut for #ident {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.base
            }
        }
    }
}
