//! Vmodl schema model.
//!
//! This crate holds the in-memory representation of a vmodl schema document:
//! the data types, enumerations and managed object types exported by the
//! schema extraction step, together with the version metadata that travels
//! alongside them. The model is read-only once loaded and is consumed by the
//! `vmomi-gen` code generator.
//!
//! ## Core Types
//!
//! - [`SchemaModel`] - The complete schema document
//! - [`DataTypeDecl`] - Plain value objects (structural, no methods)
//! - [`EnumTypeDecl`] - Flat string-valued enumerations
//! - [`ManagedTypeDecl`] - Server-resident objects reachable by reference
//! - [`FieldSpec`] / [`MethodSpec`] - Properties, parameters and methods
//! - [`PropFlags`] - The `link`/`linkable`/`optional`/`secret` bitset
//!
//! ## Examples
//!
//! ```
//! use vmomi_define::SchemaModel;
//!
//! let schema = SchemaModel::from_json(r#"{
//!     "dataTypes": [],
//!     "enumTypes": [
//!         {"vmodlName": "vim.PowerState", "wsdlName": "PowerState",
//!          "version": "vim.version.version1", "values": ["poweredOn", "poweredOff"]}
//!     ],
//!     "managedTypes": []
//! }"#).unwrap();
//!
//! assert_eq!(schema.enum_types[0].wire_name, "PowerState");
//! assert_eq!(schema.type_count(), 1);
//! ```

pub mod error;
pub mod flags;
pub mod schema;
pub mod types;

pub use error::SchemaError;
pub use flags::PropFlags;
pub use schema::{BreakingChange, SchemaModel, VersionInfo};
pub use types::{
    DataTypeDecl, EnumTypeDecl, FieldSpec, ManagedTypeDecl, MethodResult, MethodSpec, TypeKind,
};
