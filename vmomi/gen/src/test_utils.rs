//! Helpers shared by the generator's unit tests.

use proc_macro2::TokenStream;
use vmomi_define::{
    DataTypeDecl, EnumTypeDecl, FieldSpec, ManagedTypeDecl, MethodResult, MethodSpec, SchemaModel,
};

/// Parses generated tokens as a file and pretty-prints them.
///
/// Panics if the tokens are not a valid Rust file.
pub fn format_generated_code(tokens: &TokenStream) -> String {
    let file = syn::parse2::<syn::File>(tokens.clone())
        .unwrap_or_else(|e| panic!("generated code does not parse: {e}\n{tokens}"));
    prettyplease::unparse(&file)
}

/// Drops whitespace and the trailing commas the formatter adds when it
/// breaks a list over several lines.
pub fn squash(code: &str) -> String {
    let compact: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .replace(",)", ")")
        .replace(",}", "}")
        .replace(",]", "]")
        .replace(",>", ">")
}

/// `code` contains `needle`, regardless of line breaks.
///
/// A trailing comma on the needle is ignored, so the last field of a struct
/// matches like any other.
pub fn contains_code(code: &str, needle: &str) -> bool {
    let needle = squash(needle);
    squash(code).contains(needle.trim_end_matches(','))
}

/// A small schema touching every kind of declaration.
pub fn sample_schema() -> SchemaModel {
    let mut schema = SchemaModel::default();
    schema.enum_types.push(EnumTypeDecl::new(
        "vim.VirtualMachine.PowerState",
        "VirtualMachinePowerState",
        ["poweredOff", "poweredOn", "suspended"],
    ));
    schema.data_types.push(
        DataTypeDecl::new("vim.vm.RuntimeInfo", "VirtualMachineRuntimeInfo")
            .with_parent("vmodl.DynamicData")
            .with_field(FieldSpec::new("powerState", "vim.VirtualMachine.PowerState"))
            .with_field(FieldSpec::new("host", "vim.HostSystem").optional())
            .with_field(FieldSpec::new("bootTime", "vmodl.DateTime").optional()),
    );
    schema.managed_types.push(
        ManagedTypeDecl::new("vim.ManagedEntity", "ManagedEntity")
            .with_parent("vmodl.ManagedObject")
            .with_field(FieldSpec::new("name", "string"))
            .with_field(FieldSpec::new("parent", "vim.ManagedEntity").optional()),
    );
    schema.managed_types.push(
        ManagedTypeDecl::new("vim.HostSystem", "HostSystem")
            .with_parent("vim.ManagedEntity")
            .with_field(FieldSpec::new("vm", "vim.VirtualMachine[]").optional()),
    );
    schema.managed_types.push(
        ManagedTypeDecl::new("vim.VirtualMachine", "VirtualMachine")
            .with_parent("vim.ManagedEntity")
            .with_field(FieldSpec::new("runtime", "vim.vm.RuntimeInfo"))
            .with_method(
                MethodSpec::new("PowerOn", "PowerOnVM_Task", MethodResult::new("vim.Task"))
                    .with_param(FieldSpec::new("host", "vim.HostSystem").optional()),
            ),
    );
    schema.managed_types.push(
        ManagedTypeDecl::new("vim.Task", "Task").with_parent("vim.ManagedEntity"),
    );
    schema.managed_types.push(
        ManagedTypeDecl::new("vim.ServiceInstance", "ServiceInstance")
            .with_parent("vmodl.ManagedObject")
            .with_method(MethodSpec::new(
                "CurrentTime",
                "CurrentTime",
                MethodResult::new("dateTime"),
            )),
    );
    schema
}
