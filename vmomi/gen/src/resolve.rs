//! Wire type resolution.
//!
//! Every property, parameter and result type goes through [`resolve_type`].
//! Resolution never fails: a name missing from the index degrades to an
//! opaque `serde_json::Value`.

use proc_macro2::TokenStream;
use quote::quote;
use tracing::warn;
use vmomi_define::TypeKind;
use vmomi_define::types::ARRAY_MARKER;

use crate::index::{IndexKind, TypeIndex};
use crate::naming::type_ident;

/// Rust mapping of a wire scalar tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Void,
    Any,
    DateTime,
    Binary,
}

impl Primitive {
    /// Maps a scalar tag to its primitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "byte" => Self::Byte,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "void" => Self::Void,
            "anyType" => Self::Any,
            "dateTime" => Self::DateTime,
            "base64Binary" => Self::Binary,
            _ => return None,
        })
    }

    /// The scalar tag registered in descriptors.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Void => "void",
            Self::Any => "anyType",
            Self::DateTime => "dateTime",
            Self::Binary => "base64Binary",
        }
    }

    fn rust_type(self, runtime: &TokenStream) -> TokenStream {
        match self {
            Self::Byte => quote!(i8),
            Self::Short => quote!(i16),
            Self::Int => quote!(i32),
            Self::Long => quote!(i64),
            Self::Float => quote!(f32),
            Self::Double => quote!(f64),
            Self::Boolean => quote!(bool),
            Self::String => quote!(String),
            Self::Void => quote!(()),
            Self::Any => quote!(serde_json::Value),
            Self::DateTime => quote!(#runtime::DateTime),
            Self::Binary => quote!(#runtime::Binary),
        }
    }
}

/// A resolved wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(Primitive),
    /// A declared type; `builtin` types live in the runtime crate.
    Declared {
        kind: TypeKind,
        wire_name: String,
        builtin: bool,
    },
    Array(Box<ResolvedType>),
    /// A name the index does not know.
    Unknown(String),
}

/// Resolves a wire type name against the index.
///
/// ## Examples
///
/// ```
/// use vmomi_define::SchemaModel;
/// use vmomi_gen::index::TypeIndex;
/// use vmomi_gen::resolve::{Primitive, ResolvedType, resolve_type};
///
/// let index = TypeIndex::build(&SchemaModel::default());
///
/// assert_eq!(
///     resolve_type("vmodl.DateTime[]", &index),
///     ResolvedType::Array(Box::new(ResolvedType::Primitive(Primitive::DateTime)))
/// );
/// assert_eq!(
///     resolve_type("vim.Missing", &index),
///     ResolvedType::Unknown("vim.Missing".to_string())
/// );
/// ```
pub fn resolve_type(wire_type: &str, index: &TypeIndex) -> ResolvedType {
    if let Some(element) = wire_type.strip_suffix(ARRAY_MARKER) {
        return ResolvedType::Array(Box::new(resolve_type(element, index)));
    }
    if let Some(primitive) = Primitive::from_tag(wire_type) {
        return ResolvedType::Primitive(primitive);
    }

    match index.get(wire_type) {
        Some(entry) => match entry.kind {
            IndexKind::Scalar => match Primitive::from_tag(&entry.wire_name) {
                Some(primitive) => ResolvedType::Primitive(primitive),
                None => ResolvedType::Unknown(wire_type.to_string()),
            },
            IndexKind::Declared(kind) => ResolvedType::Declared {
                kind,
                wire_name: entry.wire_name.clone(),
                builtin: entry.builtin,
            },
        },
        None => {
            warn!(wire_type, "unresolved type reference, using an opaque value");
            ResolvedType::Unknown(wire_type.to_string())
        }
    }
}

impl ResolvedType {
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Void))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// The Rust type of a value.
    ///
    /// With `boxed`, data and managed types are stored behind a `Box` so that
    /// self-referencing types have a finite size. Array elements need no box.
    pub fn rust_type(&self, runtime: &TokenStream, boxed: bool) -> TokenStream {
        match self {
            Self::Primitive(primitive) => primitive.rust_type(runtime),
            Self::Declared {
                kind,
                wire_name,
                builtin,
            } => {
                let ident = type_ident(wire_name);
                let path = if *builtin {
                    quote!(#runtime::#ident)
                } else {
                    quote!(#ident)
                };
                if boxed && *kind != TypeKind::Enum {
                    quote!(Box<#path>)
                } else {
                    path
                }
            }
            Self::Array(element) => {
                let element = element.rust_type(runtime, false);
                quote!(Vec<#element>)
            }
            Self::Unknown(_) => quote!(serde_json::Value),
        }
    }

    /// Key passed to reconstruction: scalar tag or wire name, `[]`-suffixed
    /// for arrays. Unknown types keep their literal name.
    pub fn type_key(&self) -> String {
        match self {
            Self::Primitive(primitive) => primitive.tag().to_string(),
            Self::Declared { wire_name, .. } => wire_name.clone(),
            Self::Array(element) => format!("{}{}", element.type_key(), ARRAY_MARKER),
            Self::Unknown(name) => name.clone(),
        }
    }

    /// The `FieldDescriptor` expression registered for this type.
    pub fn descriptor(&self, runtime: &TokenStream) -> TokenStream {
        match self {
            Self::Primitive(primitive) => {
                let tag = primitive.tag();
                quote!(#runtime::FieldDescriptor::scalar(#tag))
            }
            Self::Declared { kind, wire_name, .. } => match kind {
                TypeKind::Enum => quote!(#runtime::FieldDescriptor::enumeration(#wire_name)),
                TypeKind::Data => quote!(#runtime::FieldDescriptor::data(#wire_name)),
                TypeKind::Managed => quote!(#runtime::FieldDescriptor::managed(#wire_name)),
            },
            Self::Array(element) => {
                let element = element.descriptor(runtime);
                quote!(#runtime::FieldDescriptor::array(#element))
            }
            Self::Unknown(name) => quote!(#runtime::FieldDescriptor::scalar(#name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmomi_define::{DataTypeDecl, EnumTypeDecl, ManagedTypeDecl, SchemaModel};

    fn index() -> TypeIndex {
        let mut schema = SchemaModel::default();
        schema
            .data_types
            .push(DataTypeDecl::new("vim.vm.RuntimeInfo", "VirtualMachineRuntimeInfo"));
        schema.enum_types.push(EnumTypeDecl::new(
            "vim.VirtualMachine.PowerState",
            "VirtualMachinePowerState",
            ["poweredOn"],
        ));
        schema
            .managed_types
            .push(ManagedTypeDecl::new("vim.HostSystem", "HostSystem"));
        TypeIndex::build(&schema)
    }

    fn runtime() -> TokenStream {
        quote!(vmomi)
    }

    #[test]
    fn primitives_map_to_rust_types() {
        let index = index();
        let cases = [
            ("byte", "i8"),
            ("short", "i16"),
            ("int", "i32"),
            ("long", "i64"),
            ("float", "f32"),
            ("double", "f64"),
            ("boolean", "bool"),
            ("string", "String"),
            ("anyType", "serde_json :: Value"),
        ];
        for (wire, rust) in cases {
            let resolved = resolve_type(wire, &index);
            assert_eq!(resolved.rust_type(&runtime(), true).to_string(), rust, "{}", wire);
        }
    }

    #[test]
    fn scalar_wrappers_resolve_to_runtime_types() {
        let index = index();
        assert_eq!(
            resolve_type("vmodl.Binary", &index).rust_type(&runtime(), true).to_string(),
            "vmomi :: Binary"
        );
        assert_eq!(
            resolve_type("vmodl.PropertyPath", &index).type_key(),
            "string"
        );
    }

    #[test]
    fn declared_types_are_boxed_in_fields() {
        let index = index();
        let host = resolve_type("vim.HostSystem", &index);
        assert_eq!(host.rust_type(&runtime(), true).to_string(), "Box < HostSystem >");
        assert_eq!(host.rust_type(&runtime(), false).to_string(), "HostSystem");

        let state = resolve_type("vim.VirtualMachine.PowerState", &index);
        assert_eq!(
            state.rust_type(&runtime(), true).to_string(),
            "VirtualMachinePowerState"
        );
    }

    #[test]
    fn arrays_of_declared_types_are_vecs() {
        let index = index();
        let hosts = resolve_type("vim.HostSystem[]", &index);
        assert_eq!(hosts.rust_type(&runtime(), true).to_string(), "Vec < HostSystem >");
        assert_eq!(hosts.type_key(), "HostSystem[]");
        assert_eq!(
            hosts.descriptor(&runtime()).to_string(),
            "vmomi :: FieldDescriptor :: array (vmomi :: FieldDescriptor :: managed (\"HostSystem\"))"
        );
    }

    #[test]
    fn builtin_types_use_runtime_path() {
        let index = index();
        let fault = resolve_type("vmodl.MethodFault", &index);
        assert_eq!(
            fault.rust_type(&runtime(), false).to_string(),
            "vmomi :: MethodFault"
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn unknown_type_degrades_to_value() {
        let index = index();
        let unknown = resolve_type("vim.NotInSchema", &index);

        assert_eq!(
            unknown.rust_type(&runtime(), true).to_string(),
            "serde_json :: Value"
        );
        assert_eq!(unknown.type_key(), "vim.NotInSchema");
        assert!(logs_contain("unresolved type reference"));
    }
}
