//! The [`Reflect`] trait and its built-in implementations.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ValueError;
use crate::geo::{LineString, Point};
use crate::kind::Kind;
use crate::type_info::TypeInfo;
use crate::types::{RawJson, Value};

/// Static self-description plus conversion to and from [`Value`] trees.
///
/// Record types normally implement this through the [`record!`](crate::record)
/// macro. Hand-written implementations are expected for opaque types that
/// carry a [`Marshaler`](crate::Marshaler).
pub trait Reflect: Sized + 'static {
    /// Describes the type.
    fn type_info() -> TypeInfo;

    /// Converts the host value into a dynamic value.
    fn to_value(&self) -> Value;

    /// Rebuilds the host value from a dynamic value.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch<T>(expected: &'static str, got: &Value) -> Result<T, ValueError> {
    Err(ValueError::TypeMismatch {
        expected,
        got: got.variant_name(),
    })
}

macro_rules! impl_signed {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl Reflect for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::of::<$ty>(Kind::Int).with_bits($bits)
            }

            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).map_err(|_| ValueError::Overflow {
                        value: v.to_string(),
                        target: stringify!($ty),
                    }),
                    Value::Uint(v) => <$ty>::try_from(v).map_err(|_| ValueError::Overflow {
                        value: v.to_string(),
                        target: stringify!($ty),
                    }),
                    other => mismatch("integer", &other),
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl Reflect for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::of::<$ty>(Kind::Uint).with_bits($bits)
            }

            fn to_value(&self) -> Value {
                Value::Uint(*self as u64)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Uint(v) => <$ty>::try_from(v).map_err(|_| ValueError::Overflow {
                        value: v.to_string(),
                        target: stringify!($ty),
                    }),
                    Value::Int(v) => <$ty>::try_from(v).map_err(|_| ValueError::Overflow {
                        value: v.to_string(),
                        target: stringify!($ty),
                    }),
                    other => mismatch("unsigned integer", &other),
                }
            }
        }
    )*};
}

impl_signed!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, isize => 64);
impl_unsigned!(u8 => 8, u16 => 16, u32 => 32, u64 => 64, usize => 64);

impl Reflect for f32 {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<f32>(Kind::Float).with_bits(32)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                Err(ValueError::Overflow {
                    value: v.to_string(),
                    target: "f32",
                })
            }
            Value::Float(v) => Ok(v as f32),
            Value::Int(v) => Ok(v as f32),
            Value::Uint(v) => Ok(v as f32),
            other => mismatch("float", &other),
        }
    }
}

impl Reflect for f64 {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<f64>(Kind::Float).with_bits(64)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::Uint(v) => Ok(v as f64),
            other => mismatch("float", &other),
        }
    }
}

impl Reflect for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<bool>(Kind::Bool)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl Reflect for String {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<String>(Kind::String)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch("string", &other),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Option<T>>(Kind::Option).with_elem(T::type_info)
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// Boxes are transparent: `Option<Box<Self>>` is how records refer to themselves.
impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn to_value(&self) -> Value {
        self.as_ref().to_value()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Vec<T>>(Kind::Array).with_elem(T::type_info)
    }

    fn to_value(&self) -> Value {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            return Value::Bytes(bytes.clone());
        }
        Value::Array(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            Value::Bytes(bytes) => bytes
                .into_iter()
                .map(|b| T::from_value(Value::Uint(u64::from(b))))
                .collect(),
            other => mismatch("array", &other),
        }
    }
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
{
    fn type_info() -> TypeInfo {
        TypeInfo::of::<HashMap<K, V>>(Kind::Map)
            .with_key(K::type_info)
            .with_elem(V::type_info)
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(HashMap::new()),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => mismatch("map", &other),
        }
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    fn type_info() -> TypeInfo {
        TypeInfo::of::<BTreeMap<K, V>>(Kind::Map)
            .with_key(K::type_info)
            .with_elem(V::type_info)
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(BTreeMap::new()),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => mismatch("map", &other),
        }
    }
}

impl Reflect for DateTime<Utc> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<DateTime<Utc>>(Kind::Struct)
            .with_zero(|| Value::Time(DateTime::<Utc>::default()))
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Time(t) => Ok(t),
            other => mismatch("time", &other),
        }
    }
}

impl Reflect for Uuid {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Uuid>(Kind::Struct).with_zero(|| Value::Uuid(Uuid::nil()))
    }

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Uuid(u) => Ok(u),
            other => mismatch("uuid", &other),
        }
    }
}

impl Reflect for RawJson {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<RawJson>(Kind::String).with_zero(|| Value::Json(String::new()))
    }

    fn to_value(&self) -> Value {
        Value::Json(self.0.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Json(s) | Value::String(s) => Ok(RawJson(s)),
            other => mismatch("json", &other),
        }
    }
}

impl Reflect for Point {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Point>(Kind::Struct).with_zero(|| Value::Point(Point::default()))
    }

    fn to_value(&self) -> Value {
        Value::Point(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Point(p) => Ok(p),
            other => mismatch("point", &other),
        }
    }
}

impl Reflect for LineString {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<LineString>(Kind::Struct).with_zero(|| Value::LineString(Vec::new()))
    }

    fn to_value(&self) -> Value {
        Value::LineString(self.0.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::LineString(points) => Ok(LineString(points)),
            other => mismatch("linestring", &other),
        }
    }
}
