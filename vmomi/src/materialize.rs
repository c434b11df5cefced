//! Second reconstruction phase: [`Decoded`] tree to generated types.

use std::str::FromStr;

use serde_json::Value;

use crate::connection::Connection;
use crate::decode::{Decoded, DecodedObject, Decoder};
use crate::error::VmomiError;
use crate::wire::{Binary, DateTime, ManagedObjectReference};

/// Builds a value from its decoded form.
///
/// Implemented for the literal types, for `Option`, `Vec` and `Box`, and by
/// every generated enum, data type and managed type.
pub trait FromDecoded: Sized {
    fn from_decoded(connection: &Connection, value: Decoded) -> Result<Self, VmomiError>;
}

/// A generated data type.
pub trait DataObjectType: Sized {
    /// Wire name of the type.
    const WIRE_TYPE: &'static str;

    /// Builds the value, consuming the fields it declares (and, through its
    /// base, the inherited ones) from `object`.
    fn from_object(connection: &Connection, object: &mut DecodedObject) -> Result<Self, VmomiError>;
}

/// A generated managed type.
pub trait ManagedObjectType: Sized {
    /// Wire name of the type.
    const WIRE_TYPE: &'static str;

    /// Creates a handle with every property unset.
    fn new(connection: &Connection, reference: ManagedObjectReference) -> Self;

    /// Copies property values from `init`, base type first.
    fn apply(&mut self, connection: &Connection, init: &mut DecodedObject) -> Result<(), VmomiError>;

    /// Creates a handle and applies the initial property values, if any.
    fn construct(
        connection: &Connection,
        reference: ManagedObjectReference,
        init: Option<&mut DecodedObject>,
    ) -> Result<Self, VmomiError> {
        let mut object = Self::new(connection, reference);
        if let Some(init) = init {
            object.apply(connection, init)?;
        }
        Ok(object)
    }
}

impl DecodedObject {
    /// Takes field `name` and materializes it as `T`.
    ///
    /// A missing required value is reported as `Type.field`.
    pub fn take<T: FromDecoded>(&mut self, connection: &Connection, name: &str) -> Result<T, VmomiError> {
        let value = self.remove(name);
        let was_null = value.is_null();
        T::from_decoded(connection, value).map_err(|err| match err {
            VmomiError::MissingValue { .. } if was_null => {
                VmomiError::missing(format!("{}.{}", self.type_key, name))
            }
            other => other,
        })
    }
}

/// Materializes a data type from a decoded value.
pub fn construct_data<T: DataObjectType>(connection: &Connection, value: Decoded) -> Result<T, VmomiError> {
    let mut object = value.into_object(T::WIRE_TYPE)?;
    T::from_object(connection, &mut object)
}

/// Materializes a managed type from a decoded handle or object.
pub fn construct_managed<T: ManagedObjectType>(
    connection: &Connection,
    value: Decoded,
) -> Result<T, VmomiError> {
    let mut object = value.into_object(T::WIRE_TYPE)?;
    let reference = object.managed_reference()?;
    if object.fields.is_empty() {
        T::construct(connection, reference, None)
    } else {
        T::construct(connection, reference, Some(&mut object))
    }
}

/// Materializes a generated enum from its wire value.
pub fn construct_enum<T: FromStr>(enum_type: &str, value: Decoded) -> Result<T, VmomiError> {
    match value {
        Decoded::Null => Err(VmomiError::missing(enum_type)),
        Decoded::Scalar(Value::String(text)) => text.parse().map_err(|_| VmomiError::UnknownEnumValue {
            enum_type: enum_type.to_string(),
            value: text,
        }),
        other => Err(VmomiError::malformed(
            enum_type,
            format!("expected a string, got {}", other.describe()),
        )),
    }
}

/// Reconstructs a raw response value as `T`.
///
/// `key` is the wire type the value was declared with (`[]`-suffixed for
/// arrays); an empty key leaves the value untyped.
pub fn reconstruct<T: FromDecoded>(connection: &Connection, raw: Value, key: &str) -> Result<T, VmomiError> {
    let decoded = Decoder::new(connection.registry())
        .with_trace(connection.debug())
        .decode(raw, key)?;
    T::from_decoded(connection, decoded)
}

fn scalar(value: Decoded, type_key: &str) -> Result<Value, VmomiError> {
    match value {
        Decoded::Null => Err(VmomiError::missing(type_key)),
        Decoded::Scalar(value) => Ok(value),
        other => Err(VmomiError::malformed(
            type_key,
            format!("expected a scalar, got {}", other.describe()),
        )),
    }
}

impl FromDecoded for String {
    fn from_decoded(_: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        match scalar(value, "string")? {
            Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }
}

impl FromDecoded for bool {
    fn from_decoded(_: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        match scalar(value, "boolean")? {
            Value::Bool(flag) => Ok(flag),
            Value::String(text) if text == "true" || text == "1" => Ok(true),
            Value::String(text) if text == "false" || text == "0" => Ok(false),
            other => Err(VmomiError::malformed("boolean", format!("unexpected value {}", other))),
        }
    }
}

macro_rules! integer_from_decoded {
    ($($ty:ty => $key:literal),* $(,)?) => {
        $(
            impl FromDecoded for $ty {
                fn from_decoded(_: &Connection, value: Decoded) -> Result<Self, VmomiError> {
                    let raw = scalar(value, $key)?;
                    let parsed = match &raw {
                        Value::Number(number) => number.as_i64().and_then(|n| <$ty>::try_from(n).ok()),
                        Value::String(text) => text.trim().parse::<$ty>().ok(),
                        _ => None,
                    };
                    parsed.ok_or_else(|| VmomiError::malformed($key, format!("unexpected value {}", raw)))
                }
            }
        )*
    };
}

integer_from_decoded!(i8 => "byte", i16 => "short", i32 => "int", i64 => "long");

macro_rules! float_from_decoded {
    ($($ty:ty => $key:literal),* $(,)?) => {
        $(
            impl FromDecoded for $ty {
                fn from_decoded(_: &Connection, value: Decoded) -> Result<Self, VmomiError> {
                    let raw = scalar(value, $key)?;
                    let parsed = match &raw {
                        Value::Number(number) => number.as_f64().map(|n| n as $ty),
                        Value::String(text) => text.trim().parse::<$ty>().ok(),
                        _ => None,
                    };
                    parsed.ok_or_else(|| VmomiError::malformed($key, format!("unexpected value {}", raw)))
                }
            }
        )*
    };
}

float_from_decoded!(f32 => "float", f64 => "double");

impl FromDecoded for Value {
    fn from_decoded(_: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        Ok(value.into_value())
    }
}

impl FromDecoded for () {
    fn from_decoded(_: &Connection, _: Decoded) -> Result<Self, VmomiError> {
        Ok(())
    }
}

impl FromDecoded for DateTime {
    fn from_decoded(_: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        match value {
            Decoded::DateTime(date_time) => Ok(date_time),
            Decoded::Scalar(Value::String(text)) => crate::wire::parse_date_time(&text),
            Decoded::Null => Err(VmomiError::missing("dateTime")),
            other => Err(VmomiError::malformed(
                "dateTime",
                format!("expected a dateTime, got {}", other.describe()),
            )),
        }
    }
}

impl FromDecoded for Binary {
    fn from_decoded(_: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        match value {
            Decoded::Binary(binary) => Ok(binary),
            Decoded::Scalar(Value::String(text)) => Binary::decode(&text),
            Decoded::Null => Err(VmomiError::missing("base64Binary")),
            other => Err(VmomiError::malformed(
                "base64Binary",
                format!("expected binary data, got {}", other.describe()),
            )),
        }
    }
}

impl<T: FromDecoded> FromDecoded for Option<T> {
    fn from_decoded(connection: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        match value {
            Decoded::Null => Ok(None),
            other => T::from_decoded(connection, other).map(Some),
        }
    }
}

impl<T: FromDecoded> FromDecoded for Vec<T> {
    /// A single non-list value is accepted as a one-element sequence.
    fn from_decoded(connection: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        match value {
            Decoded::Null => Ok(Vec::new()),
            Decoded::List(items) => items
                .into_iter()
                .map(|item| T::from_decoded(connection, item))
                .collect(),
            single => Ok(vec![T::from_decoded(connection, single)?]),
        }
    }
}

impl<T: FromDecoded> FromDecoded for Box<T> {
    fn from_decoded(connection: &Connection, value: Decoded) -> Result<Self, VmomiError> {
        T::from_decoded(connection, value).map(Box::new)
    }
}
