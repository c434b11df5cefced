//! Base types every generated hierarchy bottoms out in.
//!
//! Generated data types embed their parent as a `base` field and dereference
//! to it; the chains end in [`DataObject`] and [`ManagedObject`].

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::connection::Connection;
use crate::decode::{Decoded, DecodedObject};
use crate::descriptor::{DATA_OBJECT, DYNAMIC_DATA, MANAGED_OBJECT, METHOD_FAULT, RUNTIME_FAULT};
use crate::error::VmomiError;
use crate::materialize::{
    DataObjectType, FromDecoded, ManagedObjectType, construct_data, construct_managed,
};
use crate::wire::ManagedObjectReference;

/// Root of every managed type: a connection plus the server-side handle.
#[derive(Clone)]
pub struct ManagedObject {
    connection: Connection,
    reference: ManagedObjectReference,
}

impl ManagedObject {
    /// The connection methods on this object are invoked through.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn reference(&self) -> &ManagedObjectReference {
        &self.reference
    }

    /// The opaque server-side handle (e.g. `vm-42`).
    pub fn id(&self) -> &str {
        &self.reference.value
    }
}

impl fmt::Debug for ManagedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedObject")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ManagedObject {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Serialize for ManagedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.reference.serialize(serializer)
    }
}

impl ManagedObjectType for ManagedObject {
    const WIRE_TYPE: &'static str = MANAGED_OBJECT;

    fn new(connection: &Connection, reference: ManagedObjectReference) -> Self {
        Self {
            connection: connection.clone(),
            reference,
        }
    }

    fn apply(&mut self, _: &Connection, _: &mut DecodedObject) -> Result<(), VmomiError> {
        Ok(())
    }
}

impl FromDecoded for ManagedObject {
    fn from_decoded(connection: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        construct_managed(connection, value)
    }
}

/// Root of every data type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataObject {}

impl DataObjectType for DataObject {
    const WIRE_TYPE: &'static str = DATA_OBJECT;

    fn from_object(_: &Connection, _: &mut DecodedObject) -> Result<Self, VmomiError> {
        Ok(Self {})
    }
}

/// Base of most data types.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DynamicData {
    #[serde(flatten)]
    pub base: DataObject,
}

impl DataObjectType for DynamicData {
    const WIRE_TYPE: &'static str = DYNAMIC_DATA;

    fn from_object(connection: &Connection, object: &mut DecodedObject) -> Result<Self, VmomiError> {
        Ok(Self {
            base: DataObject::from_object(connection, object)?,
        })
    }
}

/// Root of the fault hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodFault {
    #[serde(flatten)]
    pub base: DynamicData,
    #[serde(rename = "faultCause", skip_serializing_if = "Option::is_none")]
    pub fault_cause: Option<Value>,
    #[serde(rename = "faultMessage", skip_serializing_if = "Vec::is_empty")]
    pub fault_message: Vec<Value>,
}

impl DataObjectType for MethodFault {
    const WIRE_TYPE: &'static str = METHOD_FAULT;

    fn from_object(connection: &Connection, object: &mut DecodedObject) -> Result<Self, VmomiError> {
        Ok(Self {
            base: DynamicData::from_object(connection, object)?,
            fault_cause: object.take(connection, "faultCause")?,
            fault_message: object.take(connection, "faultMessage")?,
        })
    }
}

/// Base of unchecked faults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuntimeFault {
    #[serde(flatten)]
    pub base: MethodFault,
}

impl DataObjectType for RuntimeFault {
    const WIRE_TYPE: &'static str = RUNTIME_FAULT;

    fn from_object(connection: &Connection, object: &mut DecodedObject) -> Result<Self, VmomiError> {
        Ok(Self {
            base: MethodFault::from_object(connection, object)?,
        })
    }
}

macro_rules! data_builtin {
    ($($ty:ident $(=> $parent:ident)?),* $(,)?) => {
        $(
            impl FromDecoded for $ty {
                fn from_decoded(connection: &Connection, value: Decoded) -> Result<Self, VmomiError> {
                    construct_data(connection, value)
                }
            }

            $(
                impl Deref for $ty {
                    type Target = $parent;

                    fn deref(&self) -> &$parent {
                        &self.base
                    }
                }

                impl DerefMut for $ty {
                    fn deref_mut(&mut self) -> &mut $parent {
                        &mut self.base
                    }
                }
            )?
        )*
    };
}

data_builtin!(
    DataObject,
    DynamicData => DataObject,
    MethodFault => DynamicData,
    RuntimeFault => MethodFault,
);
