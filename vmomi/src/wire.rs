//! Wire-level value shapes.
//!
//! Scalars on the wire are sometimes boxed as `{"attributes": {...}, "$value": ...}`,
//! managed objects travel as references carrying a type discriminator and an
//! opaque handle, and the `dateTime`/`base64Binary` scalars need decoding.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use chrono::{NaiveDateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::descriptor::THIS_FIELD;
use crate::error::VmomiError;

/// Key holding the unboxed value of a wire envelope.
pub const VALUE_KEY: &str = "$value";

/// Key holding the attribute metadata of a wire envelope.
pub const ATTRIBUTES_KEY: &str = "attributes";

/// Date/time values as exposed to generated code.
pub type DateTime = chrono::DateTime<Utc>;

/// Unboxes a `{$value: ...}` envelope, returning any other value unchanged.
///
/// ## Examples
///
/// ```
/// use serde_json::json;
/// use vmomi::wire::unwrap_envelope;
///
/// let boxed = json!({"attributes": {"type": "xsd:string"}, "$value": "esx-01"});
/// assert_eq!(unwrap_envelope(boxed), json!("esx-01"));
/// assert_eq!(unwrap_envelope(json!(42)), json!(42));
/// ```
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(VALUE_KEY) => {
            map.remove(VALUE_KEY).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Returns the polymorphic type discriminator carried by a wire object.
///
/// Both `attributes.type` and `attributes["xsi:type"]` are recognised; a
/// namespace prefix (`vim25:`) is dropped.
pub fn discriminator(map: &Map<String, Value>) -> Option<&str> {
    let attributes = map.get(ATTRIBUTES_KEY)?.as_object()?;
    let raw = attributes
        .get("xsi:type")
        .or_else(|| attributes.get("type"))?
        .as_str()?;
    raw.rsplit(':').next()
}

/// Parses an `xsd:dateTime` value.
///
/// Values without an offset are taken as UTC.
pub fn parse_date_time(text: &str) -> Result<DateTime, VmomiError> {
    match chrono::DateTime::parse_from_rfc3339(text) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(source) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| VmomiError::InvalidDateTime {
                value: text.to_string(),
                source,
            }),
    }
}

/// An opaque byte buffer (`vmodl.Binary`), base64-encoded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binary(pub Bytes);

impl Binary {
    /// Decodes the transport encoding.
    ///
    /// ## Examples
    ///
    /// ```
    /// use vmomi::Binary;
    ///
    /// let binary = Binary::decode("aGVsbG8=").unwrap();
    /// assert_eq!(binary.as_bytes(), b"hello");
    /// assert_eq!(binary.encode(), "aGVsbG8=");
    /// ```
    pub fn decode(encoded: &str) -> Result<Self, VmomiError> {
        let bytes = BASE64.decode(encoded.trim())?;
        Ok(Self(Bytes::from(bytes)))
    }

    pub fn encode(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl Serialize for Binary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

/// Reference to a server-resident managed object.
///
/// Serialises to the wire shape `{"attributes": {"type": T}, "$value": V}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManagedObjectReference {
    /// Wire type discriminator (e.g. `VirtualMachine`).
    pub type_name: String,
    /// Opaque handle (e.g. `vm-42`).
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.value)
    }
}

impl Serialize for ManagedObjectReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut attributes = Map::new();
        attributes.insert("type".to_string(), Value::String(self.type_name.clone()));

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(ATTRIBUTES_KEY, &attributes)?;
        map.serialize_entry(VALUE_KEY, &self.value)?;
        map.end()
    }
}

/// The `_this` argument of a method call.
///
/// The service-entry type is addressed by a literal type name; every other
/// managed type by an object reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ObjectReference {
    Root(String),
    Managed(ManagedObjectReference),
}

impl ObjectReference {
    pub fn root(type_name: impl Into<String>) -> Self {
        Self::Root(type_name.into())
    }

    pub fn managed(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Managed(ManagedObjectReference::new(type_name, value))
    }
}

/// Builds the parameter object for a method without parameters.
pub fn this_params(this: ObjectReference) -> Result<Value, VmomiError> {
    let mut params = Map::new();
    params.insert(THIS_FIELD.to_string(), serde_json::to_value(this)?);
    Ok(Value::Object(params))
}

/// Merges `_this` with the caller-supplied arguments.
///
/// `_this` always comes first; argument fields follow in declaration order.
///
/// ## Errors
///
/// Returns [`VmomiError::InvalidParameters`] if the arguments do not
/// serialize to an object.
pub fn merge_params<A: Serialize>(this: ObjectReference, args: &A) -> Result<Value, VmomiError> {
    let mut params = Map::new();
    params.insert(THIS_FIELD.to_string(), serde_json::to_value(this)?);

    match serde_json::to_value(args)? {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key != THIS_FIELD {
                    params.insert(key, value);
                }
            }
        }
        Value::Null => {}
        other => {
            return Err(VmomiError::InvalidParameters(format!(
                "expected an object, got {}",
                other
            )));
        }
    }

    Ok(Value::Object(params))
}
