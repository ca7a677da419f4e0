//! Shared types for the sqlmap workspace.
//!
//! This crate defines the dynamic value model, the static type descriptions
//! produced by [`Reflect`], and the [`record!`] macro that implements
//! [`Reflect`] for plain record structs.

pub mod error;
pub mod field;
pub mod geo;
pub mod kind;
mod macros;
pub mod reflect;
pub mod type_info;
pub mod types;

pub use error::ValueError;
pub use field::FieldDef;
pub use geo::{LineString, Point};
pub use kind::Kind;
pub use reflect::Reflect;
pub use type_info::{Marshaler, TypeInfo, TypeInfoFn};
pub use types::{RawJson, SqlArgument, SqlValue, Value};
