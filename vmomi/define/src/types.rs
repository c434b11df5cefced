//! Type declarations that make up a vmodl schema.
//!
//! This module provides the declarations consumed by the generator:
//!
//! - [`FieldSpec`] - A property or method parameter
//! - [`MethodSpec`] / [`MethodResult`] - A managed object method
//! - [`DataTypeDecl`] - A plain value object
//! - [`EnumTypeDecl`] - A flat string enumeration
//! - [`ManagedTypeDecl`] - A server-resident object with methods
//! - [`TypeKind`] - The classification used by the generator's index
//!
//! Properties and methods are positional arrays in the schema document
//! (`[name, type, version, flags, extra?]`), so they deserialise through
//! private tuple mirrors.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::flags::PropFlags;

/// Suffix that marks an array type in a wire type name.
pub const ARRAY_MARKER: &str = "[]";

/// Classification of a declared type.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use vmomi_define::TypeKind;
///
/// assert_eq!(TypeKind::Managed.to_string(), "managed");
/// assert_eq!(TypeKind::from_str("enum").unwrap(), TypeKind::Enum);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TypeKind {
    /// Flat string enumeration.
    Enum,
    /// Plain data object.
    Data,
    /// Server-resident managed object.
    Managed,
}

/// A property of a data/managed type, or a parameter of a method.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawField")]
pub struct FieldSpec {
    /// Property name as it appears on the wire.
    pub name: String,
    /// Scalar tag, qualified type name, or either with a `[]` suffix.
    pub wire_type: String,
    /// Version that introduced the property.
    pub version: String,
    /// Property flags.
    pub flags: PropFlags,
    /// Opaque trailing metadata (usually a privilege id).
    pub extra: Option<Value>,
}

#[derive(Deserialize)]
struct RawField(
    String,
    String,
    #[serde(default)] Option<String>,
    #[serde(default)] Option<PropFlags>,
    #[serde(default)] Option<Value>,
);

impl From<RawField> for FieldSpec {
    fn from(raw: RawField) -> Self {
        let RawField(name, wire_type, version, flags, extra) = raw;
        Self {
            name,
            wire_type,
            version: version.unwrap_or_default(),
            flags: flags.unwrap_or(PropFlags::empty()),
            extra: extra.filter(|v| !v.is_null()),
        }
    }
}

impl FieldSpec {
    /// Creates a required field with no version and no flags.
    ///
    /// ## Examples
    ///
    /// ```
    /// use vmomi_define::FieldSpec;
    ///
    /// let field = FieldSpec::new("name", "string").optional();
    /// assert!(field.is_optional());
    /// assert_eq!(field.wire_type, "string");
    /// ```
    pub fn new(name: impl Into<String>, wire_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wire_type: wire_type.into(),
            version: String::new(),
            flags: PropFlags::empty(),
            extra: None,
        }
    }

    /// Marks the field optional.
    pub fn optional(mut self) -> Self {
        self.flags |= PropFlags::OPTIONAL;
        self
    }

    /// Replaces the flag set.
    pub fn with_flags(mut self, flags: PropFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(PropFlags::OPTIONAL)
    }

    pub fn is_secret(&self) -> bool {
        self.flags.contains(PropFlags::SECRET)
    }

    /// Returns `true` when the wire type carries the array marker.
    pub fn is_array(&self) -> bool {
        self.wire_type.ends_with(ARRAY_MARKER)
    }
}

/// The result descriptor of a method: `[flags, type, officialType]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawResult")]
pub struct MethodResult {
    pub flags: PropFlags,
    /// Qualified result type (`void` for no result).
    pub wire_type: String,
    /// The type name used by the WSDL for the result element.
    pub wire_type_alias: String,
}

#[derive(Deserialize)]
struct RawResult(PropFlags, String, #[serde(default)] Option<String>);

impl From<RawResult> for MethodResult {
    fn from(raw: RawResult) -> Self {
        let RawResult(flags, wire_type, alias) = raw;
        let wire_type_alias = alias.unwrap_or_else(|| wire_type.clone());
        Self {
            flags,
            wire_type,
            wire_type_alias,
        }
    }
}

impl MethodResult {
    /// A required result of the given type.
    pub fn new(wire_type: impl Into<String>) -> Self {
        let wire_type = wire_type.into();
        Self {
            flags: PropFlags::empty(),
            wire_type_alias: wire_type.clone(),
            wire_type,
        }
    }

    /// A `void` result.
    pub fn void() -> Self {
        Self::new("void")
    }

    pub fn optional(mut self) -> Self {
        self.flags |= PropFlags::OPTIONAL;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(PropFlags::OPTIONAL)
    }

    pub fn is_void(&self) -> bool {
        self.wire_type == "void"
    }
}

/// A method of a managed type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawMethod")]
pub struct MethodSpec {
    /// Idiomatic method name (e.g. `PowerOn`).
    pub name: String,
    /// Name of the operation on the wire (e.g. `PowerOnVM_Task`).
    pub wire_method_name: String,
    pub version: String,
    pub parameters: Vec<FieldSpec>,
    pub result: MethodResult,
    pub extra: Option<Value>,
    /// Qualified names of the faults the method may raise.
    pub faults: Vec<String>,
}

#[derive(Deserialize)]
struct RawMethod(
    String,
    String,
    #[serde(default)] Option<String>,
    #[serde(default)] Option<Vec<FieldSpec>>,
    #[serde(default)] Option<MethodResult>,
    #[serde(default)] Option<Value>,
    #[serde(default)] Option<Vec<String>>,
);

impl From<RawMethod> for MethodSpec {
    fn from(raw: RawMethod) -> Self {
        let RawMethod(name, wire_method_name, version, parameters, result, extra, faults) = raw;
        Self {
            name,
            wire_method_name,
            version: version.unwrap_or_default(),
            parameters: parameters.unwrap_or_default(),
            result: result.unwrap_or_else(MethodResult::void),
            extra: extra.filter(|v| !v.is_null()),
            faults: faults.unwrap_or_default(),
        }
    }
}

impl MethodSpec {
    /// Creates a method with no parameters.
    ///
    /// ## Examples
    ///
    /// ```
    /// use vmomi_define::{FieldSpec, MethodResult, MethodSpec};
    ///
    /// let method = MethodSpec::new("PowerOn", "PowerOnVM_Task", MethodResult::new("vim.Task"))
    ///     .with_param(FieldSpec::new("host", "vim.HostSystem").optional());
    ///
    /// assert!(method.has_parameters());
    /// assert_eq!(method.wire_method_name, "PowerOnVM_Task");
    /// ```
    pub fn new(
        name: impl Into<String>,
        wire_method_name: impl Into<String>,
        result: MethodResult,
    ) -> Self {
        Self {
            name: name.into(),
            wire_method_name: wire_method_name.into(),
            version: String::new(),
            parameters: Vec::new(),
            result,
            extra: None,
            faults: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: FieldSpec) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// A plain data object type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataTypeDecl {
    /// Qualified vmodl name (e.g. `vim.vm.RuntimeInfo`).
    #[serde(rename = "vmodlName")]
    pub qualified_name: String,
    /// Name on the wire (e.g. `VirtualMachineRuntimeInfo`).
    #[serde(rename = "wsdlName")]
    pub wire_name: String,
    #[serde(default, deserialize_with = "null_as_empty_string")]
    pub version: String,
    /// Qualified name of the parent type, if any.
    #[serde(default, rename = "parent", deserialize_with = "empty_as_none")]
    pub parent_qualified_name: Option<String>,
    #[serde(default, rename = "props", deserialize_with = "null_as_empty")]
    pub fields: Vec<FieldSpec>,
}

impl DataTypeDecl {
    pub fn new(qualified_name: impl Into<String>, wire_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            wire_name: wire_name.into(),
            version: String::new(),
            parent_qualified_name: None,
            fields: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_qualified_name = Some(parent.into());
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// A flat string enumeration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnumTypeDecl {
    #[serde(rename = "vmodlName")]
    pub qualified_name: String,
    #[serde(rename = "wsdlName")]
    pub wire_name: String,
    #[serde(default, deserialize_with = "null_as_empty_string")]
    pub version: String,
    /// Wire values, in declaration order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Vec<String>,
}

impl EnumTypeDecl {
    pub fn new<I, S>(qualified_name: impl Into<String>, wire_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            qualified_name: qualified_name.into(),
            wire_name: wire_name.into(),
            version: String::new(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A managed (server-resident) object type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManagedTypeDecl {
    #[serde(rename = "vmodlName")]
    pub qualified_name: String,
    #[serde(rename = "wsdlName")]
    pub wire_name: String,
    #[serde(default, deserialize_with = "null_as_empty_string")]
    pub version: String,
    #[serde(default, rename = "parent", deserialize_with = "empty_as_none")]
    pub parent_qualified_name: Option<String>,
    #[serde(default, rename = "props", deserialize_with = "null_as_empty")]
    pub fields: Vec<FieldSpec>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub methods: Vec<MethodSpec>,
}

impl ManagedTypeDecl {
    pub fn new(qualified_name: impl Into<String>, wire_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            wire_name: wire_name.into(),
            version: String::new(),
            parent_qualified_name: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_qualified_name = Some(parent.into());
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_as_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
