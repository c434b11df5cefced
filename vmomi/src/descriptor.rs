//! Per-type field descriptors.
//!
//! The generated client registers one [`TypeDescriptor`] per schema type.
//! The decoder walks a raw response against these descriptors, so nothing
//! about a type's shape has to be rediscovered at call time.

use std::collections::BTreeMap;

use strum::{Display, EnumString};

/// Parameter name carrying the target object of a method call.
pub const THIS_FIELD: &str = "_this";

/// Type keys that decode as plain scalars.
pub const LITERAL_TYPES: &[&str] = &[
    "byte", "short", "int", "long", "float", "double", "boolean", "string", "anyType", "void",
];

/// Type key of `vmodl.DateTime` values.
pub const DATE_TIME_TYPE: &str = "dateTime";

/// Type key of `vmodl.Binary` values.
pub const BINARY_TYPE: &str = "base64Binary";

/// Root of the data type hierarchy.
pub const DATA_OBJECT: &str = "DataObject";
/// Base class of most data types.
pub const DYNAMIC_DATA: &str = "DynamicData";
/// Root of the fault hierarchy.
pub const METHOD_FAULT: &str = "MethodFault";
/// Base of unchecked faults.
pub const RUNTIME_FAULT: &str = "RuntimeFault";
/// Root of the managed type hierarchy.
pub const MANAGED_OBJECT: &str = "ManagedObject";

/// What a registered type is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TypeKind {
    Enum,
    Data,
    Managed,
}

/// Declared type of one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldDescriptor {
    /// A literal (`string`, `int`, `dateTime`, ...).
    Scalar(String),
    /// A generated enum, by wire name.
    Enum(String),
    /// A data type, by wire name.
    Data(String),
    /// A managed type, by wire name.
    Managed(String),
    /// A homogeneous sequence.
    Array(Box<FieldDescriptor>),
}

impl FieldDescriptor {
    pub fn scalar(type_key: impl Into<String>) -> Self {
        Self::Scalar(type_key.into())
    }

    pub fn enumeration(type_key: impl Into<String>) -> Self {
        Self::Enum(type_key.into())
    }

    pub fn data(type_key: impl Into<String>) -> Self {
        Self::Data(type_key.into())
    }

    pub fn managed(type_key: impl Into<String>) -> Self {
        Self::Managed(type_key.into())
    }

    pub fn array(element: FieldDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    /// Type key as it appears in the registry, `[]`-suffixed for arrays.
    ///
    /// ## Examples
    ///
    /// ```
    /// use vmomi::FieldDescriptor;
    ///
    /// let field = FieldDescriptor::array(FieldDescriptor::managed("VirtualMachine"));
    /// assert_eq!(field.type_key(), "VirtualMachine[]");
    /// ```
    pub fn type_key(&self) -> String {
        match self {
            Self::Scalar(key) | Self::Enum(key) | Self::Data(key) | Self::Managed(key) => key.clone(),
            Self::Array(element) => format!("{}[]", element.type_key()),
        }
    }
}

/// Registered shape of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    /// Wire name of the parent type, if any.
    pub parent: Option<String>,
    /// Fields declared by this type only; inherited ones live on the parent.
    pub fields: BTreeMap<String, FieldDescriptor>,
}

/// The descriptor map: wire type name to registered shape.
///
/// ## Examples
///
/// ```
/// use vmomi::{DescriptorRegistry, FieldDescriptor, TypeKind};
///
/// let mut registry = DescriptorRegistry::with_builtins();
/// registry.register_data(
///     "AboutInfo",
///     Some("DynamicData"),
///     [("fullName", FieldDescriptor::scalar("string"))],
/// );
///
/// assert_eq!(registry.kind_of("AboutInfo"), Some(TypeKind::Data));
/// assert_eq!(
///     registry.field("AboutInfo", "fullName"),
///     Some(&FieldDescriptor::scalar("string"))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    types: BTreeMap<String, TypeDescriptor>,
}

impl DescriptorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in base types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_data(DATA_OBJECT, None, []);
        registry.register_data(DYNAMIC_DATA, Some(DATA_OBJECT), []);
        registry.register_data(
            METHOD_FAULT,
            Some(DYNAMIC_DATA),
            [
                ("faultCause", FieldDescriptor::scalar("anyType")),
                (
                    "faultMessage",
                    FieldDescriptor::array(FieldDescriptor::scalar("anyType")),
                ),
            ],
        );
        registry.register_data(RUNTIME_FAULT, Some(METHOD_FAULT), []);
        registry.register_managed(
            MANAGED_OBJECT,
            None,
            [(THIS_FIELD, FieldDescriptor::managed(MANAGED_OBJECT))],
        );
        registry
    }

    pub fn register_enum(&mut self, name: &str) {
        self.types.insert(
            name.to_string(),
            TypeDescriptor {
                kind: TypeKind::Enum,
                parent: None,
                fields: BTreeMap::new(),
            },
        );
    }

    /// Registers a data type.
    ///
    /// A managed type of the same name is never replaced: a name collision
    /// between the two hierarchies resolves in favour of the managed entry.
    pub fn register_data<'a>(
        &mut self,
        name: &str,
        parent: Option<&str>,
        fields: impl IntoIterator<Item = (&'a str, FieldDescriptor)>,
    ) {
        if self.is_managed(name) {
            return;
        }
        self.insert(name, TypeKind::Data, parent, fields);
    }

    pub fn register_managed<'a>(
        &mut self,
        name: &str,
        parent: Option<&str>,
        fields: impl IntoIterator<Item = (&'a str, FieldDescriptor)>,
    ) {
        self.insert(name, TypeKind::Managed, parent, fields);
    }

    fn insert<'a>(
        &mut self,
        name: &str,
        kind: TypeKind,
        parent: Option<&str>,
        fields: impl IntoIterator<Item = (&'a str, FieldDescriptor)>,
    ) {
        let fields = fields
            .into_iter()
            .map(|(field, descriptor)| (field.to_string(), descriptor))
            .collect();
        self.types.insert(
            name.to_string(),
            TypeDescriptor {
                kind,
                parent: parent.map(str::to_string),
                fields,
            },
        );
    }

    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        self.types.get(name).map(|d| d.kind)
    }

    pub fn is_managed(&self, name: &str) -> bool {
        self.kind_of(name) == Some(TypeKind::Managed)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up a field on a type, falling back to its ancestors.
    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldDescriptor> {
        let mut current = Some(type_name);
        // Bounded by registry size so a cyclic parent chain terminates.
        let mut remaining = self.types.len();

        while let Some(name) = current {
            let descriptor = self.types.get(name)?;
            if let Some(found) = descriptor.fields.get(field) {
                return Some(found);
            }
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            current = descriptor.parent.as_deref();
        }
        None
    }

    /// Whether `name` is `ancestor` or derives from it.
    pub fn is_subtype_of(&self, name: &str, ancestor: &str) -> bool {
        let mut current = Some(name);
        let mut remaining = self.types.len() + 1;

        while let Some(type_name) = current {
            if type_name == ancestor {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            current = self
                .types
                .get(type_name)
                .and_then(|d| d.parent.as_deref());
        }
        false
    }
}

/// Whether a type key names a literal scalar.
pub fn is_literal(type_key: &str) -> bool {
    LITERAL_TYPES.contains(&type_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = DescriptorRegistry::with_builtins();

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.kind_of(DATA_OBJECT), Some(TypeKind::Data));
        assert!(registry.is_managed(MANAGED_OBJECT));
        assert!(registry.is_subtype_of(RUNTIME_FAULT, DATA_OBJECT));
    }

    #[test]
    fn inherited_field_resolves_through_parent() {
        let mut registry = DescriptorRegistry::with_builtins();
        registry.register_data("InvalidState", Some(RUNTIME_FAULT), []);

        assert_eq!(
            registry.field("InvalidState", "faultCause"),
            Some(&FieldDescriptor::scalar("anyType"))
        );
    }

    #[test]
    fn managed_entry_wins_over_data_collision() {
        let mut registry = DescriptorRegistry::new();
        registry.register_managed("Folder", None, [(THIS_FIELD, FieldDescriptor::managed("Folder"))]);
        registry.register_data("Folder", None, []);

        assert!(registry.is_managed("Folder"));
    }

    #[test]
    fn cyclic_parent_chain_terminates() {
        let mut registry = DescriptorRegistry::new();
        registry.register_data("A", Some("B"), []);
        registry.register_data("B", Some("A"), []);

        assert_eq!(registry.field("A", "missing"), None);
        assert!(!registry.is_subtype_of("A", "C"));
    }

    #[test]
    fn unknown_type_has_no_fields() {
        let registry = DescriptorRegistry::with_builtins();
        assert_eq!(registry.field("Nope", "name"), None);
        assert_eq!(registry.kind_of("Nope"), None);
    }

    #[test]
    fn literal_type_keys() {
        assert!(is_literal("string"));
        assert!(!is_literal(DATE_TIME_TYPE));
        assert!(!is_literal("VirtualMachine"));
    }
}
