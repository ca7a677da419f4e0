//! Broad type categories.

use std::fmt;

/// Broad category of a host type.
///
/// Kinds drive the fallback tier of codec dispatch: when no codec is
/// registered for an exact type, the codec registered for its kind is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// UTF-8 text
    String,
    /// Boolean
    Bool,
    /// Signed integer of any width
    Int,
    /// Unsigned integer of any width
    Uint,
    /// Floating point number of any width
    Float,
    /// Optional wrapper (`Option<T>`)
    Option,
    /// Record with named fields, or an opaque host type
    Struct,
    /// Ordered sequence
    Array,
    /// Associative map
    Map,
}

impl Kind {
    /// Returns `true` for integer and floating point kinds.
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Int | Kind::Uint | Kind::Float)
    }

    /// Returns `true` for integer kinds.
    pub fn is_integer(self) -> bool {
        matches!(self, Kind::Int | Kind::Uint)
    }

    /// Returns the lowercase name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Option => "option",
            Kind::Struct => "struct",
            Kind::Array => "array",
            Kind::Map => "map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
