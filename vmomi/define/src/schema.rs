//! The complete schema document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SchemaError;
use crate::types::{DataTypeDecl, EnumTypeDecl, ManagedTypeDecl};

/// A versioned vmodl schema document.
///
/// This is the JSON document written by the schema extraction step. The
/// `versions` and `breaking_changes` metadata are carried through untouched;
/// generation only reads the three type lists.
///
/// ## Examples
///
/// ```
/// use vmomi_define::SchemaModel;
///
/// let schema = SchemaModel::from_json(r#"{
///     "dataTypes": [
///         {"vmodlName": "vim.AboutInfo", "wsdlName": "AboutInfo",
///          "parent": "vmodl.DynamicData", "version": "v1",
///          "props": [["name", "string", "v1", 0]]}
///     ],
///     "enumTypes": [],
///     "managedTypes": [],
///     "versions": [
///         {"version": "v1", "namespace": "vim25", "versionId": "",
///          "isLegacy": false, "serviceNamespace": "vim", "parents": [], "flags": {}}
///     ]
/// }"#).unwrap();
///
/// assert_eq!(schema.data_types[0].fields[0].name, "name");
/// assert_eq!(schema.versions[0].namespace, "vim25");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    #[serde(default)]
    pub breaking_changes: Vec<BreakingChange>,
    #[serde(default)]
    pub data_types: Vec<DataTypeDecl>,
    #[serde(default)]
    pub enum_types: Vec<EnumTypeDecl>,
    #[serde(default)]
    pub managed_types: Vec<ManagedTypeDecl>,
    #[serde(default)]
    pub versions: Vec<VersionInfo>,
}

/// Version metadata for one API version.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionInfo {
    pub version: String,
    pub namespace: String,
    pub version_id: String,
    pub is_legacy: bool,
    pub service_namespace: String,
    pub parents: Vec<String>,
    /// Version-set membership (`newest`, `stable`, `public`, `dotted`, `oldest`).
    pub flags: BTreeMap<String, bool>,
}

/// Breaking change counters per vmodl namespace.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakingChange {
    pub branch_name: String,
    pub vmodl_namespace: String,
    pub count: u64,
}

impl SchemaModel {
    /// Parses a schema document from JSON text.
    ///
    /// ## Errors
    ///
    /// Returns [`SchemaError::Parse`] if the text is not a valid schema document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a schema document from disk.
    ///
    /// ## Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read and
    /// [`SchemaError::Parse`] if its content is not a valid schema document.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Total number of declared enum, data and managed types.
    pub fn type_count(&self) -> usize {
        self.data_types.len() + self.enum_types.len() + self.managed_types.len()
    }

    /// Versions flagged as members of the given version set (e.g. `"newest"`).
    pub fn versions_in_set<'a>(&'a self, set: &'a str) -> impl Iterator<Item = &'a VersionInfo> {
        self.versions
            .iter()
            .filter(move |v| v.flags.get(set).copied().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "breakingChanges": [{"branchName": "main", "vmodlNamespace": "vim", "count": 3}],
        "dataTypes": [],
        "enumTypes": [
            {"vmodlName": "vim.TaskInfo.State", "wsdlName": "TaskInfoState",
             "version": "v1", "values": ["queued", "running", "success", "error"]}
        ],
        "managedTypes": [
            {"vmodlName": "vim.Task", "wsdlName": "Task", "parent": "vim.ExtensibleManagedObject",
             "version": "v1", "props": null, "methods": null}
        ],
        "versions": [
            {"version": "v1", "namespace": "vim25", "versionId": "5.5", "isLegacy": false,
             "serviceNamespace": "vim", "parents": [], "flags": {"newest": true}},
            {"version": "v0", "namespace": "vim2", "versionId": "", "isLegacy": true,
             "serviceNamespace": "vim", "parents": [], "flags": {}}
        ]
    }"#;

    #[test]
    fn parses_full_document() {
        let schema = SchemaModel::from_json(DOCUMENT).unwrap();

        assert_eq!(schema.type_count(), 2);
        assert_eq!(schema.enum_types[0].values.len(), 4);
        assert!(schema.managed_types[0].methods.is_empty());
        assert_eq!(schema.breaking_changes[0].count, 3);
        assert!(schema.versions[1].is_legacy);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let schema = SchemaModel::from_json("{}").unwrap();
        assert_eq!(schema.type_count(), 0);
        assert!(schema.versions.is_empty());
    }

    #[test]
    fn versions_in_set_filters_by_flag() {
        let schema = SchemaModel::from_json(DOCUMENT).unwrap();
        let newest: Vec<_> = schema.versions_in_set("newest").collect();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].version_id, "5.5");
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = SchemaModel::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let schema = SchemaModel::load(file.path()).unwrap();
        assert_eq!(schema.managed_types[0].wire_name, "Task");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SchemaModel::load(Path::new("/nonexistent/schema.json")).unwrap_err();
        match err {
            SchemaError::Io { path, .. } => assert!(path.contains("schema.json")),
            other => panic!("Unexpected error: {:?}", other),
        }
    }
}
