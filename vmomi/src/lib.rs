//! Runtime for generated vmodl clients
//!
//! Code produced by `vmomi-gen` declares the types of a vmodl API and a
//! descriptor registry describing their fields. This crate interprets that
//! registry at call time: raw responses are decoded against the registry and
//! then materialized into the generated types, and generated methods reach
//! the server through a pluggable [`Transport`].
//!
//! ## Core Types
//!
//! - [`Connection`] - Session wrapper; `exec`, `login`, `reconstruct`
//! - [`Transport`] - The RPC seam a concrete wire protocol implements
//! - [`DescriptorRegistry`] - Wire type name to [`TypeDescriptor`]
//! - [`FieldDescriptor`] - Scalar, enum, data, managed or array field type
//! - [`Decoded`] - The neutral tree a raw response decodes into
//! - [`FromDecoded`] - Materializes typed values from a [`Decoded`] tree
//! - [`ManagedObject`], [`DataObject`] - Roots of the generated hierarchies
//!
//! ## Examples
//!
//! ```
//! use serde_json::json;
//! use vmomi::{BoxFuture, Connection, Transport, TransportError, TransportReply};
//!
//! struct Offline;
//!
//! impl Transport for Offline {
//!     fn call<'a>(
//!         &'a self,
//!         _method: &'a str,
//!         _params: serde_json::Value,
//!     ) -> BoxFuture<'a, Result<Option<TransportReply>, TransportError>> {
//!         Box::pin(async { Err(TransportError::Protocol("offline".into())) })
//!     }
//! }
//!
//! let connection = Connection::new(Offline);
//! let values: Vec<i32> = connection.reconstruct(json!([1, "2"]), "int[]").unwrap();
//! assert_eq!(values, vec![1, 2]);
//! ```

pub mod builtins;
pub mod connection;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod materialize;
pub mod transport;
pub mod wire;

#[cfg(test)]
mod testing;

pub use builtins::{DataObject, DynamicData, ManagedObject, MethodFault, RuntimeFault};
pub use connection::{Connection, ConnectionBuilder, DEFAULT_ROOT_TYPE, SESSION_COOKIE};
pub use decode::{Decoded, DecodedObject, Decoder};
pub use descriptor::{DescriptorRegistry, FieldDescriptor, THIS_FIELD, TypeDescriptor, TypeKind};
pub use error::{LOGIN_REJECTED_MESSAGE, TransportError, VmomiError};
pub use materialize::{
    DataObjectType, FromDecoded, ManagedObjectType, construct_data, construct_enum,
    construct_managed, reconstruct,
};
pub use transport::{BoxFuture, Transport, TransportReply};
pub use wire::{
    Binary, DateTime, ManagedObjectReference, ObjectReference, merge_params, this_params,
};
