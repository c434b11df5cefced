//! The name-resolution table built once per generation run.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use vmomi_define::{SchemaModel, TypeKind};

/// What a qualified name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// A schema-level scalar wrapper; the wire name is the scalar tag.
    Scalar,
    /// A declared (or built-in) type.
    Declared(TypeKind),
}

/// One entry of the [`TypeIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub wire_name: String,
    pub kind: IndexKind,
    /// Supplied by the runtime rather than generated.
    pub builtin: bool,
}

impl IndexEntry {
    fn builtin(wire_name: &str, kind: IndexKind) -> Self {
        Self {
            wire_name: wire_name.to_string(),
            kind,
            builtin: true,
        }
    }

    pub fn type_kind(&self) -> Option<TypeKind> {
        match self.kind {
            IndexKind::Declared(kind) => Some(kind),
            IndexKind::Scalar => None,
        }
    }
}

/// Built-in scalar wrappers: qualified name to scalar tag.
pub const BUILTIN_SCALARS: &[(&str, &str)] = &[
    ("vmodl.DateTime", "dateTime"),
    ("vmodl.Binary", "base64Binary"),
    ("vmodl.MethodName", "string"),
    ("vmodl.PropertyPath", "string"),
    ("vmodl.TypeName", "string"),
];

/// Built-in base types supplied by the runtime.
pub const BUILTIN_TYPES: &[(&str, &str, TypeKind)] = &[
    ("vmodl.DataObject", "DataObject", TypeKind::Data),
    ("vmodl.DynamicData", "DynamicData", TypeKind::Data),
    ("vmodl.MethodFault", "MethodFault", TypeKind::Data),
    ("vmodl.RuntimeFault", "RuntimeFault", TypeKind::Data),
    ("vmodl.ManagedObject", "ManagedObject", TypeKind::Managed),
];

/// Qualified name to `{wire name, kind}`.
///
/// Built-ins are seeded first and schema types layered on top; a schema type
/// never replaces an existing entry.
///
/// ## Examples
///
/// ```
/// use vmomi_define::{DataTypeDecl, SchemaModel, TypeKind};
/// use vmomi_gen::index::TypeIndex;
///
/// let mut schema = SchemaModel::default();
/// schema.data_types.push(DataTypeDecl::new("vim.AboutInfo", "AboutInfo"));
///
/// let index = TypeIndex::build(&schema);
/// assert_eq!(index.get("vim.AboutInfo").unwrap().wire_name, "AboutInfo");
/// assert_eq!(index.kind_of("vmodl.ManagedObject"), Some(TypeKind::Managed));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl TypeIndex {
    /// Builds the index for one schema.
    pub fn build(schema: &SchemaModel) -> Self {
        let mut index = Self::default();

        for (qualified, tag) in BUILTIN_SCALARS {
            index
                .entries
                .insert(qualified.to_string(), IndexEntry::builtin(tag, IndexKind::Scalar));
        }
        for (qualified, wire_name, kind) in BUILTIN_TYPES {
            index.entries.insert(
                qualified.to_string(),
                IndexEntry::builtin(wire_name, IndexKind::Declared(*kind)),
            );
        }

        for decl in &schema.data_types {
            index.insert(&decl.qualified_name, &decl.wire_name, TypeKind::Data);
        }
        for decl in &schema.enum_types {
            index.insert(&decl.qualified_name, &decl.wire_name, TypeKind::Enum);
        }
        for decl in &schema.managed_types {
            index.insert(&decl.qualified_name, &decl.wire_name, TypeKind::Managed);
        }

        debug!(entries = index.entries.len(), "built type index");
        index
    }

    fn insert(&mut self, qualified: &str, wire_name: &str, kind: TypeKind) {
        if let Some(existing) = self.entries.get(qualified) {
            warn!(
                qualified,
                existing = %existing.wire_name,
                "type already indexed, keeping the first definition"
            );
            return;
        }
        self.entries.insert(
            qualified.to_string(),
            IndexEntry {
                wire_name: wire_name.to_string(),
                kind: IndexKind::Declared(kind),
                builtin: false,
            },
        );
    }

    pub fn get(&self, qualified: &str) -> Option<&IndexEntry> {
        self.entries.get(qualified)
    }

    pub fn kind_of(&self, qualified: &str) -> Option<TypeKind> {
        self.get(qualified).and_then(IndexEntry::type_kind)
    }

    /// Whether `qualified` is owned by the runtime rather than the schema.
    pub fn is_builtin(&self, qualified: &str) -> bool {
        self.get(qualified).is_some_and(|e| e.builtin)
    }

    /// Whether the declaration `(qualified, wire_name)` is the indexed one.
    ///
    /// False for declarations shadowed by a built-in or an earlier duplicate;
    /// those are not emitted.
    pub fn owns(&self, qualified: &str, wire_name: &str) -> bool {
        self.get(qualified)
            .is_some_and(|e| !e.builtin && e.wire_name == wire_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
