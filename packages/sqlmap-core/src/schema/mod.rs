//! Record introspection: field descriptors, schema building and caching.

mod builder;
mod cache;
mod field;
mod options;

use std::collections::HashMap;

use sqlmap_types::{TypeInfo, Value};

pub use builder::build_schema;
pub use cache::SchemaCache;
pub use field::{FieldDescriptor, FieldId};
pub use options::{FieldOptions, Generated, EMPTY_OPTIONS};

/// Compiled field layout of one record type.
///
/// Fields live in a flat arena in breadth-first order and refer to each other
/// by [`FieldId`].
#[derive(Debug, Clone)]
pub struct TypeSchema {
    ty: TypeInfo,
    roots: Vec<FieldId>,
    fields: Vec<FieldDescriptor>,
    properties: Vec<FieldId>,
    index: HashMap<String, FieldId>,
}

impl TypeSchema {
    /// Description of the record type.
    pub fn type_info(&self) -> &TypeInfo {
        &self.ty
    }

    pub fn name(&self) -> &'static str {
        self.ty.name()
    }

    /// Fields declared directly on the record.
    pub fn roots(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.roots.iter().map(|&id| &self.fields[id])
    }

    /// Every descriptor in traversal order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> &FieldDescriptor {
        &self.fields[id]
    }

    pub fn children(&self, id: FieldId) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields[id].children.iter().map(|&c| &self.fields[c])
    }

    pub fn parent(&self, id: FieldId) -> Option<&FieldDescriptor> {
        self.fields[id].parent.map(|p| &self.fields[p])
    }

    /// Column-level fields in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.properties.iter().map(|&id| &self.fields[id])
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Looks up a field by dotted path.
    pub fn lookup(&self, path: &str) -> Option<&FieldDescriptor> {
        self.index.get(path).map(|&id| &self.fields[id])
    }

    /// Looks up a column-level field by column name.
    pub fn property(&self, name: &str) -> Option<&FieldDescriptor> {
        self.lookup(name).filter(|f| self.properties.contains(&f.id))
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.properties().filter(|f| f.is_primary_key())
    }

    /// Descendants of a field, depth-first in declaration order.
    pub fn descendants(&self, id: FieldId) -> Vec<&FieldDescriptor> {
        let mut out = Vec::new();
        let mut stack: Vec<FieldId> = self.fields[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(&self.fields[next]);
            stack.extend(self.fields[next].children.iter().rev().copied());
        }
        out
    }

    /// Mutable access to a field's slot in a record value tree.
    ///
    /// `Null` ancestors (unset optional records) are replaced by their zero
    /// value on the way down.
    pub fn slot_mut<'v>(&self, root: &'v mut Value, id: FieldId) -> Option<&'v mut Value> {
        let mut chain = vec![id];
        let mut parent = self.fields[id].parent;
        while let Some(p) = parent {
            chain.push(p);
            parent = self.fields[p].parent;
        }
        chain.reverse();

        let mut current = root;
        for (step, &fid) in chain.iter().enumerate() {
            let field = &self.fields[fid];
            let position = *field.index.last()?;
            current = match current {
                Value::Record(values) => values.get_mut(position)?,
                _ => return None,
            };
            if step + 1 < chain.len() && current.is_null() {
                *current = field.ty.deref().zero_value();
            }
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
