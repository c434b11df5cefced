//! Bound method generation.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use vmomi_define::MethodSpec;

use super::CodegenContext;
use super::data_types::FieldPlan;

/// The items emitted for one method.
#[derive(Debug, Clone)]
pub struct MethodItems {
    /// The `pub async fn`, to be placed in the type's `impl` block.
    pub method: TokenStream,
    /// The arguments struct, absent for methods without parameters.
    pub args: Option<TokenStream>,
}

/// Generates one async method of a managed type.
///
/// The body builds `_this` (a literal tag for the root type, an object
/// reference otherwise), merges it with the arguments, calls the transport
/// through the connection and reconstructs the `result` field.
///
/// ## Examples
///
/// ```ignore
/// pub async fn power_on(&self, args: VirtualMachinePowerOnArgs) -> Result<Task, vmomi::VmomiError> {
///     let this = vmomi::ObjectReference::managed("VirtualMachine", vmomi::ManagedObject::id(self));
///     let params = vmomi::merge_params(this, &args)?;
///     let result = vmomi::ManagedObject::connection(self)
///         .exec("PowerOnVM_Task", params)
///         .await?
///         .result;
///     vmomi::ManagedObject::connection(self).reconstruct(result, "Task")
/// }
/// ```
pub fn generate_method(
    type_wire_name: &str,
    method: &MethodSpec,
    ident: &Ident,
    args_ident: &Ident,
    ctx: &CodegenContext<'_>,
) -> MethodItems {
    let runtime = &ctx.runtime;
    let wire_method = &method.wire_method_name;
    let doc = format!(" `{}` (`{}`).", method.name, method.wire_method_name);

    let this = if type_wire_name == ctx.options.root_type {
        quote! { #runtime::ObjectReference::root(#type_wire_name) }
    } else {
        quote! { #runtime::ObjectReference::managed(#type_wire_name, #runtime::ManagedObject::id(self)) }
    };

    let (args_param, params, args) = if method.has_parameters() {
        (
            quote! { , args: #args_ident },
            quote! { #runtime::merge_params(this, &args)? },
            Some(generate_args(method, args_ident, ctx)),
        )
    } else {
        (quote! {}, quote! { #runtime::this_params(this)? }, None)
    };

    let result = ctx.resolve(&method.result.wire_type);
    let call = quote! {
        #runtime::ManagedObject::connection(self)
            .exec(#wire_method, params)
            .await?
            .result
    };

    let (return_type, tail) = if result.is_void() {
        (
            quote!(()),
            quote! {
                let _ = #call;
                Ok(())
            },
        )
    } else {
        let inner = result.rust_type(runtime, false);
        let return_type = if method.result.is_optional() {
            quote!(Option<#inner>)
        } else {
            inner
        };
        let key = result.type_key();
        (
            return_type,
            quote! {
                let result = #call;
                #runtime::ManagedObject::connection(self).reconstruct(result, #key)
            },
        )
    };

    let method = quote! {
        #[doc = #doc]
        pub async fn #ident(&self #args_param) -> Result<#return_type, #runtime::VmomiError> {
            let this = #this;
            let params = #params;
            #tail
        }
    };

    MethodItems { method, args }
}

/// The arguments struct of a method. Parameters keep their declaration order.
///
/// Secret parameters are redacted from the `Debug` output.
fn generate_args(method: &MethodSpec, args_ident: &Ident, ctx: &CodegenContext<'_>) -> TokenStream {
    let runtime = &ctx.runtime;
    let doc = format!(" Arguments of `{}`.", method.wire_method_name);
    let params = FieldPlan::plan_all(&method.parameters, ctx);
    let debug = generate_args_debug(args_ident, &params);
    let derives = if debug.is_empty() {
        quote!(#[derive(Debug, Clone, serde::Serialize)])
    } else {
        quote!(#[derive(Clone, serde::Serialize)])
    };
    let fields = params.iter().map(|param| {
        let ident = &param.ident;
        let wire = &param.wire_name;
        let inner = param.resolved.rust_type(runtime, false);
        if param.optional {
            quote! {
                #[serde(rename = #wire, skip_serializing_if = "Option::is_none")]
                pub #ident: Option<#inner>,
            }
        } else {
            quote! {
                #[serde(rename = #wire)]
                pub #ident: #inner,
            }
        }
    });

    quote! {
        #[doc = #doc]
        #derives
        pub struct #args_ident {
            #(#fields)*
        }

        #debug
    }
}

/// A `Debug` impl printing secret fields as `<redacted>`. Empty when no
/// parameter is secret.
fn generate_args_debug(args_ident: &Ident, params: &[FieldPlan]) -> TokenStream {
    if !params.iter().any(|param| param.secret) {
        return quote! {};
    }

    let name = args_ident.to_string();
    let entries = params.iter().map(|param| {
        let ident = &param.ident;
        let label = ident.to_string();
        let label = label.trim_start_matches("r#");
        if param.secret {
            quote! { .field(#label, &"<redacted>") }
        } else {
            quote! { .field(#label, &self.#ident) }
        }
    });

    quote! {
        impl std::fmt::Debug for #args_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(#name)
                    #(#entries)*
                    .finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorOptions;
    use crate::index::TypeIndex;
    use crate::test_utils::{contains_code, format_generated_code};
    use quote::format_ident;
    use vmomi_define::{FieldSpec, ManagedTypeDecl, MethodResult, PropFlags, SchemaModel};

    fn index() -> TypeIndex {
        let mut schema = SchemaModel::default();
        schema
            .managed_types
            .push(ManagedTypeDecl::new("vim.Task", "Task"));
        schema
            .managed_types
            .push(ManagedTypeDecl::new("vim.HostSystem", "HostSystem"));
        TypeIndex::build(&schema)
    }

    fn generate(type_wire_name: &str, method: &MethodSpec) -> (String, Option<String>) {
        let index = index();
        let options = GeneratorOptions::default();
        let ctx = CodegenContext::new(&index, &options).unwrap();
        let items = generate_method(
            type_wire_name,
            method,
            &format_ident!("power_on"),
            &format_ident!("VirtualMachinePowerOnArgs"),
            &ctx,
        );
        let tokens = &items.method;
        let method = format_generated_code(&quote! { impl Holder { #tokens } });
        let args = items.args.as_ref().map(format_generated_code);
        (method, args)
    }

    #[test]
    fn method_with_parameters_merges_args() {
        let method = MethodSpec::new("PowerOn", "PowerOnVM_Task", MethodResult::new("vim.Task"))
            .with_param(FieldSpec::new("host", "vim.HostSystem").optional());
        let (code, args) = generate("VirtualMachine", &method);

        assert!(contains_code(&code, "pub async fn power_on(&self, args: VirtualMachinePowerOnArgs)"));
        assert!(contains_code(&code, "-> Result<Task, vmomi::VmomiError>"));
        assert!(contains_code(&code, "vmomi::merge_params(this, &args)?"));
        assert!(contains_code(&code, ".exec(\"PowerOnVM_Task\", params)"));
        assert!(contains_code(&code, ".reconstruct(result, \"Task\")"));

        let args = args.unwrap();
        assert!(contains_code(&args, "pub struct VirtualMachinePowerOnArgs"));
        assert!(contains_code(&args, "pub host: Option<HostSystem>,"));
    }

    #[test]
    fn secret_parameters_are_redacted_from_debug() {
        let method = MethodSpec::new("Login", "Login", MethodResult::new("vim.Task"))
            .with_param(FieldSpec::new("userName", "string"))
            .with_param(FieldSpec::new("password", "string").with_flags(PropFlags::SECRET));
        let (_, args) = generate("SessionManager", &method);

        let args = args.unwrap();
        assert!(contains_code(&args, "#[derive(Clone, serde::Serialize)]"));
        assert!(contains_code(&args, "impl std::fmt::Debug for VirtualMachinePowerOnArgs"));
        assert!(contains_code(&args, ".field(\"user_name\", &self.user_name)"));
        assert!(contains_code(&args, ".field(\"password\", &\"<redacted>\")"));
    }

    #[test]
    fn managed_this_is_an_object_reference() {
        let method = MethodSpec::new("PowerOn", "PowerOnVM_Task", MethodResult::new("vim.Task"));
        let (code, args) = generate("VirtualMachine", &method);

        assert!(contains_code(&code, "pub async fn power_on(&self)"));
        assert!(contains_code(
            &code,
            "vmomi::ObjectReference::managed(\"VirtualMachine\", vmomi::ManagedObject::id(self))"
        ));
        assert!(contains_code(&code, "vmomi::this_params(this)?"));
        assert!(args.is_none());
    }

    #[test]
    fn root_type_uses_literal_tag() {
        let method = MethodSpec::new("CurrentTime", "CurrentTime", MethodResult::new("dateTime"));
        let (code, _) = generate("ServiceInstance", &method);

        assert!(contains_code(&code, "vmomi::ObjectReference::root(\"ServiceInstance\")"));
        assert!(contains_code(&code, "-> Result<vmomi::DateTime, vmomi::VmomiError>"));
        assert!(contains_code(&code, ".reconstruct(result, \"dateTime\")"));
    }

    #[test]
    fn optional_array_result() {
        let method = MethodSpec::new(
            "QueryHosts",
            "QueryHosts",
            MethodResult::new("vim.HostSystem[]").optional(),
        );
        let (code, _) = generate("VirtualMachine", &method);

        assert!(contains_code(&code, "-> Result<Option<Vec<HostSystem>>, vmomi::VmomiError>"));
        assert!(contains_code(&code, ".reconstruct(result, \"HostSystem[]\")"));
    }

    #[test]
    fn void_result_discards_reply() {
        let method = MethodSpec::new("Destroy", "Destroy", MethodResult::void());
        let (code, _) = generate("VirtualMachine", &method);

        assert!(contains_code(&code, "-> Result<(), vmomi::VmomiError>"));
        assert!(contains_code(&code, "Ok(())"));
        assert!(!contains_code(&code, "reconstruct"));
    }
}
