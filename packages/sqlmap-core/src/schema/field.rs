//! Field descriptors.

use sqlmap_types::{Kind, TypeInfo, Value};

use super::options::FieldOptions;

/// Index of a descriptor within its schema's field arena.
pub type FieldId = usize;

/// Compiled metadata for one mapped field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub(crate) id: FieldId,
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) index: Vec<usize>,
    pub(crate) ty: TypeInfo,
    pub(crate) nullable: bool,
    pub(crate) options: FieldOptions,
    pub(crate) parent: Option<FieldId>,
    pub(crate) children: Vec<FieldId>,
    pub(crate) depth: usize,
    pub(crate) embedded: bool,
    pub(crate) recursive: bool,
}

impl FieldDescriptor {
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Dotted logical path, e.g. `address.city`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Column name: the tag name, or the declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positions of the field within the record value tree.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Declared type, including any `Option` wrapping.
    pub fn type_info(&self) -> &TypeInfo {
        &self.ty
    }

    /// Whether the field or one of its ancestors is optional.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    pub fn children(&self) -> &[FieldId] {
        &self.children
    }

    /// Nesting depth, `0` for fields declared on the root record.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the field is an embedded record whose fields are hoisted.
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Whether expansion stopped here because the type refers back to an ancestor.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn is_primary_key(&self) -> bool {
        self.options.primary_key
    }

    /// Kind after peeling optional wrappers.
    pub fn kind(&self) -> Kind {
        self.ty.deref().kind()
    }

    /// Borrows the field's value out of a record value tree.
    ///
    /// Returns `None` when an optional ancestor is `Null` or the tree does
    /// not have the expected shape.
    pub fn value_in<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        let mut current = root;
        for &position in &self.index {
            match current {
                Value::Record(fields) => current = fields.get(position)?,
                _ => return None,
            }
        }
        Some(current)
    }
}
