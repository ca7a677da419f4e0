//! Breadth-first schema construction.

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};

use sqlmap_types::{Kind, TypeInfo};
use tracing::trace;

use super::field::{FieldDescriptor, FieldId};
use super::options::FieldOptions;
use super::TypeSchema;
use crate::error::SchemaError;

/// A record whose fields are still to be visited.
struct Pending {
    parent: Option<FieldId>,
    record: TypeInfo,
    prefix: String,
    index: Vec<usize>,
    depth: usize,
    nullable: bool,
    ancestors: Vec<TypeId>,
}

/// Introspects a record type into a [`TypeSchema`].
///
/// Fields are visited breadth-first. Annotation tags are parsed once into
/// [`FieldOptions`]; their values are not validated here.
///
/// # Arguments
/// * `ty` - Description of the record type
///
/// # Returns
/// The compiled schema, or `SchemaError::NotARecord` for non-record roots.
pub fn build_schema(ty: &TypeInfo) -> Result<TypeSchema, SchemaError> {
    if ty.kind() != Kind::Struct {
        return Err(SchemaError::NotARecord {
            type_name: ty.name(),
            kind: ty.kind(),
        });
    }

    let mut fields: Vec<FieldDescriptor> = Vec::new();
    let mut roots: Vec<FieldId> = Vec::new();
    let mut index: HashMap<String, FieldId> = HashMap::new();
    let mut queue = VecDeque::new();

    queue.push_back(Pending {
        parent: None,
        record: ty.clone(),
        prefix: String::new(),
        index: Vec::new(),
        depth: 0,
        nullable: false,
        ancestors: vec![ty.id()],
    });

    while let Some(pending) = queue.pop_front() {
        for (position, def) in pending.record.fields().iter().enumerate() {
            let options = FieldOptions::parse(def.tag());
            if options.hidden || (!def.is_exported() && !def.is_embedded()) {
                continue;
            }

            let declared = def.type_info();
            let target = declared.deref();
            let expandable = target.kind() == Kind::Struct && !target.fields().is_empty();
            let flatten = def.is_embedded() && options.name.is_none() && expandable;
            let recursive = expandable && pending.ancestors.contains(&target.id());

            let name = options
                .name
                .clone()
                .unwrap_or_else(|| def.name().to_string());
            let path = format!("{}{}", pending.prefix, name);
            let mut field_index = pending.index.clone();
            field_index.push(position);
            let nullable = pending.nullable || declared.is_nullable();

            let id = fields.len();
            match pending.parent {
                Some(parent) => fields[parent].children.push(id),
                None => roots.push(id),
            }

            if !flatten {
                // Outer fields shadow hoisted ones; at equal depth the later one wins.
                let shadowed = index
                    .get(&path)
                    .is_some_and(|&existing| fields[existing].depth < pending.depth);
                if !shadowed {
                    index.insert(path.clone(), id);
                }
            }

            if recursive {
                trace!("Not expanding recursive field '{}' of {}", path, ty.name());
            }

            if expandable && !recursive {
                let mut ancestors = pending.ancestors.clone();
                ancestors.push(target.id());
                queue.push_back(Pending {
                    parent: Some(id),
                    record: target.clone(),
                    prefix: if flatten {
                        pending.prefix.clone()
                    } else {
                        format!("{path}.")
                    },
                    index: field_index.clone(),
                    depth: pending.depth + 1,
                    nullable,
                    ancestors,
                });
            }

            fields.push(FieldDescriptor {
                id,
                path,
                name,
                index: field_index,
                ty: declared,
                nullable,
                options,
                parent: pending.parent,
                children: Vec::new(),
                depth: pending.depth,
                embedded: flatten,
                recursive,
            });
        }
    }

    let mut properties: Vec<FieldId> = fields
        .iter()
        .filter(|f| !f.embedded && is_column_level(&fields, f))
        .filter(|f| index.get(&f.path) == Some(&f.id))
        .map(|f| f.id)
        .collect();
    properties.sort_by(|&a, &b| fields[a].index.cmp(&fields[b].index));

    Ok(TypeSchema {
        ty: ty.clone(),
        roots,
        fields,
        properties,
        index,
    })
}

/// A field maps to its own column when every ancestor is a flattened embed.
fn is_column_level(fields: &[FieldDescriptor], field: &FieldDescriptor) -> bool {
    let mut parent = field.parent;
    while let Some(id) = parent {
        if !fields[id].embedded {
            return false;
        }
        parent = fields[id].parent;
    }
    true
}
