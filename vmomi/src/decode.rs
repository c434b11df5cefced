//! First reconstruction phase: raw wire value to [`Decoded`] tree.
//!
//! Decoding walks the raw value against the descriptor registry and produces
//! an owned, typed intermediate tree. Generated types are only materialized
//! from that tree afterwards, so a value is never visited twice and a type
//! that refers to itself cannot send the walk into a loop.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::trace;

use crate::descriptor::{
    BINARY_TYPE, DATE_TIME_TYPE, DescriptorRegistry, TypeKind, is_literal,
};
use crate::error::VmomiError;
use crate::wire::{
    ATTRIBUTES_KEY, Binary, DateTime, ManagedObjectReference, VALUE_KEY, discriminator,
    parse_date_time, unwrap_envelope,
};

/// A decoded response value.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    /// A literal, enum value or value of an unregistered type.
    Scalar(Value),
    DateTime(DateTime),
    Binary(Binary),
    List(Vec<Decoded>),
    /// A data object or managed object.
    Object(DecodedObject),
}

/// A decoded data or managed object, fields keyed by wire name.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedObject {
    /// Wire type the object was decoded as.
    pub type_key: String,
    /// Managed object handle; `None` for data objects.
    pub reference: Option<String>,
    pub fields: BTreeMap<String, Decoded>,
}

impl DecodedObject {
    pub fn new(type_key: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            reference: None,
            fields: BTreeMap::new(),
        }
    }

    /// Creates a managed object handle without property values.
    pub fn handle(type_key: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            reference: Some(reference.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Decoded) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Removes a field, yielding [`Decoded::Null`] when absent.
    pub fn remove(&mut self, name: &str) -> Decoded {
        self.fields.remove(name).unwrap_or(Decoded::Null)
    }

    /// Reference to the managed object this value describes.
    ///
    /// ## Errors
    ///
    /// Returns [`VmomiError::MalformedResponse`] if the object carries no handle.
    pub fn managed_reference(&self) -> Result<ManagedObjectReference, VmomiError> {
        match &self.reference {
            Some(value) => Ok(ManagedObjectReference::new(&self.type_key, value)),
            None => Err(VmomiError::malformed(
                &self.type_key,
                "managed object without a reference",
            )),
        }
    }
}

impl Decoded {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Unwraps an object value.
    ///
    /// A bare string is accepted as the handle of a managed object of
    /// `expected` type.
    ///
    /// ## Errors
    ///
    /// - [`VmomiError::MissingValue`] for [`Decoded::Null`]
    /// - [`VmomiError::MalformedResponse`] for any other non-object value
    pub fn into_object(self, expected: &str) -> Result<DecodedObject, VmomiError> {
        match self {
            Self::Object(object) => Ok(object),
            Self::Scalar(Value::String(handle)) => Ok(DecodedObject::handle(expected, handle)),
            Self::Null => Err(VmomiError::missing(expected)),
            other => Err(VmomiError::malformed(
                expected,
                format!("expected an object, got {}", other.describe()),
            )),
        }
    }

    /// Converts back to an untyped JSON value.
    pub fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(value) => value,
            Self::DateTime(date_time) => Value::String(date_time.to_rfc3339()),
            Self::Binary(binary) => Value::String(binary.encode()),
            Self::List(items) => Value::Array(items.into_iter().map(Self::into_value).collect()),
            Self::Object(object) => {
                let mut map = Map::new();
                if let Some(reference) = object.reference {
                    map.insert(VALUE_KEY.to_string(), Value::String(reference));
                }
                for (name, value) in object.fields {
                    map.insert(name, value.into_value());
                }
                Value::Object(map)
            }
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "a scalar",
            Self::DateTime(_) => "a dateTime",
            Self::Binary(_) => "binary data",
            Self::List(_) => "a list",
            Self::Object(_) => "an object",
        }
    }
}

/// Decodes raw responses against a descriptor registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r DescriptorRegistry,
    trace: bool,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r DescriptorRegistry) -> Self {
        Self {
            registry,
            trace: false,
        }
    }

    /// Emits a trace event for every decoded value.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Decodes `raw` as a value of the type named by `key`.
    ///
    /// An empty key decodes the value as an untyped scalar.
    ///
    /// ## Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use vmomi::{Decoded, Decoder, DescriptorRegistry};
    ///
    /// let registry = DescriptorRegistry::with_builtins();
    /// let decoded = Decoder::new(&registry).decode(json!("foo"), "string").unwrap();
    /// assert_eq!(decoded, Decoded::Scalar(json!("foo")));
    /// ```
    pub fn decode(&self, raw: Value, key: &str) -> Result<Decoded, VmomiError> {
        if self.trace {
            trace!(type_key = key, "decoding response value");
        }

        if raw.is_null() {
            return Ok(Decoded::Null);
        }
        if key.is_empty() {
            return Ok(Decoded::Scalar(unwrap_envelope(raw)));
        }

        let key = key.strip_suffix("[]").unwrap_or(key);

        if let Value::Array(items) = raw {
            return items
                .into_iter()
                .map(|item| self.decode(item, key))
                .collect::<Result<Vec<_>, _>>()
                .map(Decoded::List);
        }

        if key == DATE_TIME_TYPE {
            return match unwrap_envelope(raw) {
                Value::String(text) => parse_date_time(&text).map(Decoded::DateTime),
                other => Err(VmomiError::malformed(key, format!("expected a string, got {}", other))),
            };
        }
        if key == BINARY_TYPE {
            return match unwrap_envelope(raw) {
                Value::String(text) => Binary::decode(&text).map(Decoded::Binary),
                other => Err(VmomiError::malformed(key, format!("expected a string, got {}", other))),
            };
        }
        if is_literal(key) || self.registry.kind_of(key) == Some(TypeKind::Enum) {
            return Ok(Decoded::Scalar(unwrap_envelope(raw)));
        }

        let effective = self.effective_type(&raw, key);
        match self.registry.kind_of(&effective) {
            Some(TypeKind::Managed) => self.decode_managed(raw, effective),
            Some(TypeKind::Data) => self.decode_data(raw, effective),
            Some(TypeKind::Enum) => Ok(Decoded::Scalar(unwrap_envelope(raw))),
            None => Ok(Decoded::Scalar(raw)),
        }
    }

    /// The declared type, or the registered subtype the value names.
    ///
    /// A discriminator naming a type outside the declared type's hierarchy
    /// is ignored.
    fn effective_type(&self, raw: &Value, key: &str) -> String {
        let declared = key.to_string();
        let Some(map) = raw.as_object() else {
            return declared;
        };
        match discriminator(map) {
            Some(actual) if actual != key && self.registry.is_subtype_of(actual, key) => {
                if self.trace {
                    trace!(declared = key, actual, "using polymorphic type");
                }
                actual.to_string()
            }
            Some(actual) if actual != key && self.trace => {
                trace!(declared = key, actual, "discriminator is not a subtype, ignored");
                declared
            }
            _ => declared,
        }
    }

    fn decode_managed(&self, raw: Value, type_key: String) -> Result<Decoded, VmomiError> {
        match raw {
            Value::String(handle) => Ok(Decoded::Object(DecodedObject::handle(type_key, handle))),
            Value::Object(map) => {
                let mut object = DecodedObject::new(type_key);
                for (name, value) in map {
                    if name == VALUE_KEY {
                        object.reference = match unwrap_envelope(value) {
                            Value::String(handle) => Some(handle),
                            Value::Null => None,
                            other => Some(other.to_string()),
                        };
                        continue;
                    }
                    if name == ATTRIBUTES_KEY {
                        continue;
                    }
                    let decoded = self.decode_field(&object.type_key, &name, value)?;
                    object.fields.insert(name, decoded);
                }
                Ok(Decoded::Object(object))
            }
            other => Err(VmomiError::malformed(
                type_key,
                format!("expected a reference, got {}", other),
            )),
        }
    }

    fn decode_data(&self, raw: Value, type_key: String) -> Result<Decoded, VmomiError> {
        let Value::Object(map) = raw else {
            return Err(VmomiError::malformed(
                type_key,
                format!("expected an object, got {}", raw),
            ));
        };

        let mut object = DecodedObject::new(type_key);
        for (name, value) in map {
            if name == ATTRIBUTES_KEY {
                continue;
            }
            let decoded = self.decode_field(&object.type_key, &name, value)?;
            object.fields.insert(name, decoded);
        }
        Ok(Decoded::Object(object))
    }

    fn decode_field(&self, owner: &str, name: &str, value: Value) -> Result<Decoded, VmomiError> {
        match self.registry.field(owner, name) {
            Some(field) => self.decode(value, &field.type_key()),
            None => {
                if self.trace {
                    trace!(owner, field = name, "field not described, kept as-is");
                }
                Ok(Decoded::Scalar(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DYNAMIC_DATA, FieldDescriptor, MANAGED_OBJECT, THIS_FIELD};
    use serde_json::json;

    fn registry() -> DescriptorRegistry {
        let mut registry = DescriptorRegistry::with_builtins();
        registry.register_enum("VirtualMachinePowerState");
        registry.register_data(
            "VirtualMachineRuntimeInfo",
            Some(DYNAMIC_DATA),
            [
                (
                    "powerState",
                    FieldDescriptor::enumeration("VirtualMachinePowerState"),
                ),
                ("bootTime", FieldDescriptor::scalar(DATE_TIME_TYPE)),
                ("host", FieldDescriptor::managed("HostSystem")),
            ],
        );
        registry.register_data(
            "VirtualMachineRuntimeInfoEx",
            Some("VirtualMachineRuntimeInfo"),
            [("extra", FieldDescriptor::scalar("int"))],
        );
        registry.register_managed(
            "HostSystem",
            Some(MANAGED_OBJECT),
            [
                (THIS_FIELD, FieldDescriptor::managed("HostSystem")),
                ("name", FieldDescriptor::scalar("string")),
            ],
        );
        registry
    }

    #[test]
    fn null_stays_null_for_any_key() {
        let registry = registry();
        let decoder = Decoder::new(&registry);
        assert_eq!(decoder.decode(Value::Null, "HostSystem").unwrap(), Decoded::Null);
        assert_eq!(decoder.decode(Value::Null, "").unwrap(), Decoded::Null);
    }

    #[test]
    fn empty_key_unwraps_envelope() {
        let registry = registry();
        let decoded = Decoder::new(&registry)
            .decode(json!({"$value": "x"}), "")
            .unwrap();
        assert_eq!(decoded, Decoded::Scalar(json!("x")));
    }

    #[test]
    fn enum_value_is_scalar() {
        let registry = registry();
        let decoded = Decoder::new(&registry)
            .decode(json!({"$value": "poweredOn"}), "VirtualMachinePowerState")
            .unwrap();
        assert_eq!(decoded, Decoded::Scalar(json!("poweredOn")));
    }

    #[test]
    fn data_fields_follow_descriptors() {
        let registry = registry();
        let raw = json!({
            "attributes": {"type": "VirtualMachineRuntimeInfo"},
            "powerState": "poweredOff",
            "bootTime": "2024-01-01T00:00:00Z",
            "host": {"attributes": {"type": "HostSystem"}, "$value": "host-9"},
            "undeclared": {"a": 1}
        });

        let Decoded::Object(object) = Decoder::new(&registry)
            .decode(raw, "VirtualMachineRuntimeInfo")
            .unwrap()
        else {
            panic!("expected an object");
        };

        assert!(matches!(object.fields["bootTime"], Decoded::DateTime(_)));
        assert_eq!(object.fields["undeclared"], Decoded::Scalar(json!({"a": 1})));
        match &object.fields["host"] {
            Decoded::Object(host) => {
                assert_eq!(host.type_key, "HostSystem");
                assert_eq!(host.reference.as_deref(), Some("host-9"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!object.fields.contains_key("attributes"));
    }

    #[test]
    fn polymorphic_value_uses_registered_subtype() {
        let registry = registry();
        let raw = json!({
            "attributes": {"xsi:type": "VirtualMachineRuntimeInfoEx"},
            "extra": "7",
            "powerState": "suspended"
        });

        let Decoded::Object(object) = Decoder::new(&registry)
            .decode(raw, "VirtualMachineRuntimeInfo")
            .unwrap()
        else {
            panic!("expected an object");
        };
        assert_eq!(object.type_key, "VirtualMachineRuntimeInfoEx");
        assert_eq!(object.fields["powerState"], Decoded::Scalar(json!("suspended")));
    }

    #[test]
    fn unrelated_discriminator_keeps_declared_type() {
        let registry = registry();
        let raw = json!({
            "attributes": {"xsi:type": "HostSystem"},
            "powerState": "poweredOn"
        });

        let Decoded::Object(object) = Decoder::new(&registry)
            .decode(raw, "VirtualMachineRuntimeInfo")
            .unwrap()
        else {
            panic!("expected an object");
        };
        assert_eq!(object.type_key, "VirtualMachineRuntimeInfo");
        assert_eq!(object.fields["powerState"], Decoded::Scalar(json!("poweredOn")));
    }

    #[test]
    fn arrays_decode_elementwise() {
        let registry = registry();
        let decoded = Decoder::new(&registry)
            .decode(json!(["host-1", "host-2"]), "HostSystem[]")
            .unwrap();

        let Decoded::List(items) = decoded else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            Decoded::Object(DecodedObject::handle("HostSystem", "host-2"))
        );
    }

    #[test]
    fn unknown_type_is_kept_raw() {
        let registry = registry();
        let raw = json!({"anything": true});
        let decoded = Decoder::new(&registry).decode(raw.clone(), "NotRegistered").unwrap();
        assert_eq!(decoded, Decoded::Scalar(raw));
    }

    #[test]
    fn data_type_rejects_scalar() {
        let registry = registry();
        let err = Decoder::new(&registry)
            .decode(json!(12), "VirtualMachineRuntimeInfo")
            .unwrap_err();
        assert!(matches!(err, VmomiError::MalformedResponse { .. }));
    }

    #[test]
    fn managed_type_rejects_number() {
        let registry = registry();
        let err = Decoder::new(&registry).decode(json!(12), "HostSystem").unwrap_err();
        assert!(matches!(err, VmomiError::MalformedResponse { .. }));
    }

    #[test]
    fn binary_is_decoded() {
        let registry = registry();
        let decoded = Decoder::new(&registry)
            .decode(json!("aGk="), BINARY_TYPE)
            .unwrap();
        assert_eq!(decoded, Decoded::Binary(Binary::from(b"hi".to_vec())));
    }

    #[test]
    fn into_object_accepts_handle() {
        let object = Decoded::Scalar(json!("vm-1")).into_object("VirtualMachine").unwrap();
        assert_eq!(
            object.managed_reference().unwrap(),
            ManagedObjectReference::new("VirtualMachine", "vm-1")
        );
    }

    #[test]
    fn into_object_of_null_is_missing() {
        let err = Decoded::Null.into_object("AboutInfo").unwrap_err();
        assert!(matches!(err, VmomiError::MissingValue { .. }));
    }

    #[test]
    fn into_value_restores_json() {
        let object = DecodedObject::handle("HostSystem", "host-1")
            .with_field("name", Decoded::Scalar(json!("esx")));
        assert_eq!(
            Decoded::Object(object).into_value(),
            json!({"$value": "host-1", "name": "esx"})
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn trace_mode_logs_decoding() {
        let registry = registry();
        Decoder::new(&registry)
            .with_trace(true)
            .decode(json!("x"), "string")
            .unwrap();
        assert!(logs_contain("decoding response value"));
    }
}
