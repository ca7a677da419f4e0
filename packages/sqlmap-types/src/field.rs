//! Declared record fields.

use std::fmt;

use crate::type_info::{TypeInfo, TypeInfoFn};

/// A field as declared on a record type.
///
/// The field type is resolved lazily through a function pointer so that
/// self-referential records (`Option<Box<Self>>`) can be described without
/// infinite recursion.
#[derive(Clone)]
pub struct FieldDef {
    name: &'static str,
    tag: &'static str,
    embedded: bool,
    exported: bool,
    ty: TypeInfoFn,
}

impl FieldDef {
    /// Creates an exported, non-embedded field with an empty tag.
    pub fn new(name: &'static str, ty: TypeInfoFn) -> Self {
        Self {
            name,
            tag: "",
            embedded: false,
            exported: true,
            ty,
        }
    }

    /// Sets the annotation tag (`"column,option,option=value"`).
    #[must_use]
    pub fn sql(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    /// Marks the field as an embedded record whose fields are hoisted.
    #[must_use]
    pub fn embed(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Hides the field from mapping.
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.tag = "-";
        self
    }

    /// Marks the field as not externally visible.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Accepts field documentation passed through the `record!` macro.
    #[doc(hidden)]
    #[must_use]
    pub fn doc(self, _text: &'static str) -> Self {
        self
    }

    /// Declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw annotation tag.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Whether the field is an embedded record.
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Whether the field is externally visible.
    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Resolves the declared type of the field.
    pub fn type_info(&self) -> TypeInfo {
        (self.ty)()
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("embedded", &self.embedded)
            .field("exported", &self.exported)
            .finish_non_exhaustive()
    }
}
