//! Static type descriptions.

use std::any::TypeId;
use std::fmt;

use crate::field::FieldDef;
use crate::kind::Kind;
use crate::types::{SqlArgument, SqlValue, Value};

/// Lazily resolved type description.
pub type TypeInfoFn = fn() -> TypeInfo;

/// Custom SQL marshal/unmarshal capability carried by a type.
///
/// When present it takes precedence over every registered codec.
#[derive(Clone, Copy)]
pub struct Marshaler {
    /// Converts a value of the type into a SQL argument.
    pub encode: fn(&Value) -> Result<SqlArgument, String>,
    /// Converts a wire value back into a value of the type.
    pub decode: fn(&SqlValue) -> Result<Value, String>,
}

impl fmt::Debug for Marshaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marshaler").finish_non_exhaustive()
    }
}

/// Description of a host type.
///
/// Built by [`Reflect::type_info`](crate::Reflect::type_info). Element and key
/// types are stored as function pointers and resolved on demand.
#[derive(Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    kind: Kind,
    bits: u8,
    elem: Option<TypeInfoFn>,
    key: Option<TypeInfoFn>,
    fields: Vec<FieldDef>,
    zero: Option<fn() -> Value>,
    marshaler: Option<Marshaler>,
}

impl TypeInfo {
    /// Creates a description for `T` with the given kind.
    pub fn of<T: 'static>(kind: Kind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind,
            bits: 0,
            elem: None,
            key: None,
            fields: Vec::new(),
            zero: None,
            marshaler: None,
        }
    }

    /// Sets the numeric bit width.
    #[must_use]
    pub fn with_bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    /// Sets the element type (option inner, sequence element, map value).
    #[must_use]
    pub fn with_elem(mut self, elem: TypeInfoFn) -> Self {
        self.elem = Some(elem);
        self
    }

    /// Sets the map key type.
    #[must_use]
    pub fn with_key(mut self, key: TypeInfoFn) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the declared record fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    /// Overrides the zero value derived from the kind.
    #[must_use]
    pub fn with_zero(mut self, zero: fn() -> Value) -> Self {
        self.zero = Some(zero);
        self
    }

    /// Attaches a custom SQL marshaler.
    #[must_use]
    pub fn with_marshaler(mut self, marshaler: Marshaler) -> Self {
        self.marshaler = Some(marshaler);
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Numeric bit width, `0` for non-numeric types.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn elem(&self) -> Option<TypeInfo> {
        self.elem.map(|f| f())
    }

    pub fn key(&self) -> Option<TypeInfo> {
        self.key.map(|f| f())
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn marshaler(&self) -> Option<&Marshaler> {
        self.marshaler.as_ref()
    }

    /// Returns `true` if this describes `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns `true` for optional types.
    pub fn is_nullable(&self) -> bool {
        self.kind == Kind::Option
    }

    /// Peels every optional layer and returns the innermost type.
    pub fn deref(&self) -> TypeInfo {
        let mut current = self.clone();
        while current.kind == Kind::Option {
            match current.elem() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    /// Zero value of the type, used to initialize decode targets.
    pub fn zero_value(&self) -> Value {
        if let Some(zero) = self.zero {
            return zero();
        }
        match self.kind {
            Kind::String => Value::String(String::new()),
            Kind::Bool => Value::Bool(false),
            Kind::Int => Value::Int(0),
            Kind::Uint => Value::Uint(0),
            Kind::Float => Value::Float(0.0),
            Kind::Option => Value::Null,
            Kind::Struct => Value::Record(
                self.fields
                    .iter()
                    .map(|field| field.type_info().zero_value())
                    .collect(),
            ),
            Kind::Array => Value::Array(Vec::new()),
            Kind::Map => Value::Map(Vec::new()),
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bits", &self.bits)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
