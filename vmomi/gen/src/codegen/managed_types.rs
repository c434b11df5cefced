//! Managed type generation.
//!
//! A managed type is a handle: the struct embeds its parent (down to the
//! runtime's `ManagedObject`, which holds the connection and reference), every
//! property is an `Option` filled in by `ManagedObjectType::apply`, and each
//! method becomes an async method in an inherent `impl` block.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use tracing::warn;
use vmomi_define::{ManagedTypeDecl, TypeKind};

use super::CodegenContext;
use super::data_types::{FieldPlan, ParentPlan, deref_impls};
use super::methods::generate_method;
use crate::naming::{IdentScope, args_ident, method_ident, type_ident};
use crate::resolve::ResolvedType;

/// Wire name of the runtime's managed root type.
pub const MANAGED_ROOT: &str = "ManagedObject";

/// Resolves a managed type's parent, falling back to the runtime root.
pub(crate) fn managed_parent(decl: &ManagedTypeDecl, ctx: &CodegenContext<'_>) -> ParentPlan {
    let runtime = &ctx.runtime;
    let root = || ParentPlan {
        path: quote!(#runtime::ManagedObject),
        wire_name: MANAGED_ROOT.to_string(),
    };

    let Some(parent) = decl.parent_qualified_name.as_deref() else {
        return root();
    };
    match ctx.resolve(parent) {
        resolved @ ResolvedType::Declared {
            kind: TypeKind::Managed,
            ..
        } => ParentPlan {
            path: resolved.rust_type(runtime, false),
            wire_name: resolved.type_key(),
        },
        _ => {
            warn!(
                type_name = %decl.wire_name,
                parent,
                "managed type parent does not resolve to a managed type, using the runtime root"
            );
            root()
        }
    }
}

/// Method and arguments-struct identifiers of every method, in declaration
/// order. Repeated names get a numeric suffix.
pub(crate) fn method_idents(decl: &ManagedTypeDecl) -> Vec<(Ident, Ident)> {
    let mut method_scope = IdentScope::new();
    let mut args_scope = IdentScope::new();
    decl.methods
        .iter()
        .map(|method| {
            (
                method_scope.claim(method_ident(&method.name)),
                args_scope.claim(args_ident(&decl.wire_name, &method.name)),
            )
        })
        .collect()
}

/// Generates the struct, trait impls, methods and argument structs for a
/// managed type.
pub fn generate_managed_type(decl: &ManagedTypeDecl, ctx: &CodegenContext<'_>) -> TokenStream {
    let runtime = &ctx.runtime;
    let ident = type_ident(&decl.wire_name);
    let wire_name = &decl.wire_name;
    let doc = format!(" `{}` (`{}`).", decl.qualified_name, decl.wire_name);

    let parent = managed_parent(decl, ctx);
    let parent_path = &parent.path;
    let fields = FieldPlan::plan_all(&decl.fields, ctx);

    let field_decls = fields.iter().map(|field| {
        let field_ident = &field.ident;
        let ty = field.rust_type(runtime, true);
        quote! { pub #field_ident: #ty, }
    });
    let field_defaults = fields.iter().map(|field| {
        let field_ident = &field.ident;
        quote! { #field_ident: None, }
    });
    let field_applies = fields.iter().map(|field| {
        let field_ident = &field.ident;
        let field_wire = &field.wire_name;
        quote! { self.#field_ident = init.take(connection, #field_wire)?; }
    });

    let mut methods = Vec::with_capacity(decl.methods.len());
    let mut args_structs = Vec::new();
    for (method, (method_ident, args_ident)) in decl.methods.iter().zip(method_idents(decl)) {
        let items = generate_method(&decl.wire_name, method, &method_ident, &args_ident, ctx);
        methods.push(items.method);
        args_structs.extend(items.args);
    }

    let deref = deref_impls(&ident, parent_path);
    let methods_impl = if methods.is_empty() {
        quote! {}
    } else {
        quote! {
            impl #ident {
                #(#methods)*
            }
        }
    };

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #ident {
            pub base: #parent_path,
            #(#field_decls)*
        }

        #deref

        impl #runtime::ManagedObjectType for #ident {
            const WIRE_TYPE: &'static str = #wire_name;

            fn new(
                connection: &#runtime::Connection,
                reference: #runtime::ManagedObjectReference,
            ) -> Self {
                Self {
                    base: <#parent_path as #runtime::ManagedObjectType>::new(connection, reference),
                    #(#field_defaults)*
                }
            }

            fn apply(
                &mut self,
                connection: &#runtime::Connection,
                init: &mut #runtime::DecodedObject,
            ) -> Result<(), #runtime::VmomiError> {
                #runtime::ManagedObjectType::apply(&mut self.base, connection, init)?;
                #(#field_applies)*
                Ok(())
            }
        }

        impl #runtime::FromDecoded for #ident {
            fn from_decoded(
                connection: &#runtime::Connection,
                value: #runtime::Decoded,
            ) -> Result<Self, #runtime::VmomiError> {
                #runtime::construct_managed(connection, value)
            }
        }

        impl serde::Serialize for #ident {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(#runtime::ManagedObject::reference(self), serializer)
            }
        }

        #methods_impl

        #(#args_structs)*
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorOptions;
    use crate::index::TypeIndex;
    use crate::test_utils::{contains_code, format_generated_code};
    use vmomi_define::{DataTypeDecl, FieldSpec, MethodResult, MethodSpec, SchemaModel};

    fn schema() -> SchemaModel {
        let mut schema = SchemaModel::default();
        schema.managed_types.push(
            ManagedTypeDecl::new("vim.ManagedEntity", "ManagedEntity")
                .with_parent("vmodl.ManagedObject")
                .with_field(FieldSpec::new("name", "string"))
                .with_field(FieldSpec::new("parent", "vim.ManagedEntity").optional()),
        );
        schema.managed_types.push(
            ManagedTypeDecl::new("vim.VirtualMachine", "VirtualMachine")
                .with_parent("vim.ManagedEntity")
                .with_field(FieldSpec::new("runtime", "vim.vm.RuntimeInfo"))
                .with_field(FieldSpec::new("snapshot", "vim.vm.Snapshot[]").optional())
                .with_method(
                    MethodSpec::new("PowerOn", "PowerOnVM_Task", MethodResult::new("vim.Task"))
                        .with_param(FieldSpec::new("host", "vim.HostSystem").optional()),
                )
                .with_method(MethodSpec::new(
                    "Unregister",
                    "UnregisterVM",
                    MethodResult::void(),
                )),
        );
        schema
            .managed_types
            .push(ManagedTypeDecl::new("vim.Detached", "Detached").with_parent("vim.vm.RuntimeInfo"));
        schema
            .data_types
            .push(DataTypeDecl::new("vim.vm.RuntimeInfo", "VirtualMachineRuntimeInfo"));
        schema
            .managed_types
            .push(ManagedTypeDecl::new("vim.vm.Snapshot", "VirtualMachineSnapshot"));
        schema
    }

    fn generate(position: usize) -> String {
        let schema = schema();
        let index = TypeIndex::build(&schema);
        let options = GeneratorOptions::default();
        let ctx = CodegenContext::new(&index, &options).unwrap();
        format_generated_code(&generate_managed_type(&schema.managed_types[position], &ctx))
    }

    #[test]
    fn builtin_parent_is_the_runtime_root() {
        let code = generate(0);

        assert!(contains_code(&code, "pub base: vmomi::ManagedObject,"));
        assert!(contains_code(
            &code,
            "base: <vmomi::ManagedObject as vmomi::ManagedObjectType>::new(connection, reference),"
        ));
    }

    #[test]
    fn properties_are_always_optional() {
        let code = generate(1);

        assert!(contains_code(&code, "pub base: ManagedEntity,"));
        assert!(contains_code(
            &code,
            "pub runtime: Option<Box<VirtualMachineRuntimeInfo>>,"
        ));
        assert!(contains_code(&code, "pub snapshot: Option<Vec<VirtualMachineSnapshot>>,"));
        assert!(contains_code(&code, "runtime: None,"));
    }

    #[test]
    fn apply_runs_base_first() {
        let code = generate(1);

        let base = code
            .find("vmomi::ManagedObjectType::apply(&mut self.base, connection, init)?;")
            .unwrap();
        let own = code
            .find("self.runtime = init.take(connection, \"runtime\")?;")
            .unwrap();
        assert!(base < own);
    }

    #[test]
    fn methods_and_args_are_emitted() {
        let code = generate(1);

        assert!(contains_code(&code, "impl VirtualMachine {"));
        assert!(contains_code(&code, "pub async fn power_on(&self, args: VirtualMachinePowerOnArgs)"));
        assert!(contains_code(&code, "pub async fn unregister(&self)"));
        assert!(contains_code(&code, "pub struct VirtualMachinePowerOnArgs"));
        assert!(!contains_code(&code, "VirtualMachineUnregisterArgs"));
    }

    #[test]
    fn serializes_as_reference() {
        let code = generate(0);

        assert!(contains_code(&code, "impl serde::Serialize for ManagedEntity"));
        assert!(contains_code(
            &code,
            "serde::Serialize::serialize(vmomi::ManagedObject::reference(self), serializer)"
        ));
    }

    #[test]
    #[tracing_test::traced_test]
    fn non_managed_parent_falls_back_to_root() {
        let code = generate(2);

        assert!(contains_code(&code, "pub base: vmomi::ManagedObject,"));
        assert!(logs_contain("using the runtime root"));
    }
}
