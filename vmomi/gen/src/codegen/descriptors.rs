//! Descriptor registry generation.
//!
//! The registry is what runtime reconstruction walks: it must list exactly
//! the fields the generated structs take from a decoded object, under the
//! same wire names.

use proc_macro2::TokenStream;
use quote::quote;
use vmomi_define::FieldSpec;

use super::data_types::data_parent;
use super::managed_types::{managed_parent, method_idents};
use super::{CodegenContext, EmissionPlan};
use crate::naming::{method_ident, type_ident};

/// Wire name of the operation returning the service content.
pub const RETRIEVE_CONTENT: &str = "RetrieveServiceContent";

fn field_entries(fields: &[FieldSpec], ctx: &CodegenContext<'_>) -> Vec<TokenStream> {
    fields
        .iter()
        .map(|field| {
            let name = &field.name;
            let descriptor = ctx.resolve(&field.wire_type).descriptor(&ctx.runtime);
            quote! { (#name, #descriptor), }
        })
        .collect()
}

/// Generates `descriptor_registry()`, `connect()` and the entry point helpers.
///
/// Enums register with no fields; managed types carry a trailing `_this`
/// entry naming themselves.
///
/// ## Examples
///
/// ```ignore
/// pub fn descriptor_registry() -> vmomi::DescriptorRegistry {
///     let mut registry = vmomi::DescriptorRegistry::with_builtins();
///     registry.register_enum("VirtualMachinePowerState");
///     registry.register_data(
///         "AboutInfo",
///         Some("DynamicData"),
///         [("fullName", vmomi::FieldDescriptor::scalar("string"))],
///     );
///     registry
/// }
/// ```
pub fn generate_descriptor_registry(plan: &EmissionPlan<'_>, ctx: &CodegenContext<'_>) -> TokenStream {
    let runtime = &ctx.runtime;
    let root_type = ctx.options.root_type.as_str();
    let entry_points = generate_entry_points(plan, ctx);

    let enums = plan.enums.iter().map(|decl| {
        let wire_name = &decl.wire_name;
        quote! { registry.register_enum(#wire_name); }
    });

    let data = plan.data_types.iter().map(|decl| {
        let wire_name = &decl.wire_name;
        let parent = match data_parent(decl, ctx) {
            Some(parent) => {
                let parent = parent.wire_name;
                quote!(Some(#parent))
            }
            None => quote!(None),
        };
        let entries = field_entries(&decl.fields, ctx);
        quote! {
            registry.register_data(#wire_name, #parent, [#(#entries)*]);
        }
    });

    let managed = plan.managed_types.iter().map(|decl| {
        let wire_name = &decl.wire_name;
        let parent = managed_parent(decl, ctx).wire_name;
        let entries = field_entries(&decl.fields, ctx);
        quote! {
            registry.register_managed(
                #wire_name,
                Some(#parent),
                [#(#entries)* (#runtime::THIS_FIELD, #runtime::FieldDescriptor::managed(#wire_name)),],
            );
        }
    });

    quote! {
        /// Field descriptors of every type in this module, on top of the
        /// runtime built-ins.
        pub fn descriptor_registry() -> #runtime::DescriptorRegistry {
            let mut registry = #runtime::DescriptorRegistry::with_builtins();
            #(#enums)*
            #(#data)*
            #(#managed)*
            registry
        }

        /// Binds a transport to this module's descriptor registry.
        pub fn connect(transport: impl #runtime::Transport + 'static) -> #runtime::Connection {
            #runtime::Connection::builder(transport)
                .registry(descriptor_registry())
                .root_type(#root_type)
                .build()
        }

        #entry_points
    }
}

/// Generates the root handle function and, when the root type declares
/// `RetrieveServiceContent`, the `content()` shortcut.
///
/// Nothing is emitted when the root type is not part of the schema.
fn generate_entry_points(plan: &EmissionPlan<'_>, ctx: &CodegenContext<'_>) -> TokenStream {
    let runtime = &ctx.runtime;
    let root_type = ctx.options.root_type.as_str();
    let Some(root) = plan.managed_types.iter().find(|decl| decl.wire_name == root_type) else {
        return quote! {};
    };

    let root_ident = type_ident(root_type);
    let handle_ident = method_ident(root_type);
    let handle_doc = format!(" Handle to the `{}` entry point.", root_type);
    let handle = quote! {
        #[doc = #handle_doc]
        pub fn #handle_ident(connection: &#runtime::Connection) -> #root_ident {
            <#root_ident as #runtime::ManagedObjectType>::new(
                connection,
                #runtime::ManagedObjectReference::new(#root_type, #root_type),
            )
        }
    };

    let retrieve = root
        .methods
        .iter()
        .zip(method_idents(root))
        .find(|(method, _)| {
            method.wire_method_name == RETRIEVE_CONTENT && !method.has_parameters()
        });
    let content = match retrieve {
        Some((method, (ident, _))) if !ctx.resolve(&method.result.wire_type).is_void() => {
            let inner = ctx.resolve(&method.result.wire_type).rust_type(runtime, false);
            let return_type = if method.result.is_optional() {
                quote!(Option<#inner>)
            } else {
                inner
            };
            quote! {
                /// Retrieves the service content through the entry point.
                pub async fn content(
                    connection: &#runtime::Connection,
                ) -> Result<#return_type, #runtime::VmomiError> {
                    let root = #handle_ident(connection);
                    root.#ident().await
                }
            }
        }
        _ => quote! {},
    };

    quote! {
        #handle
        #content
    }
}
