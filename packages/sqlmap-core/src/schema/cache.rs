//! Bounded schema cache.

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sqlmap_types::{Reflect, TypeInfo};
use tracing::debug;

use super::builder::build_schema;
use super::TypeSchema;
use crate::error::SchemaError;

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<TypeId, Arc<TypeSchema>>,
    order: VecDeque<TypeId>,
}

/// Fixed-capacity cache of compiled schemas keyed by type.
///
/// Eviction follows insertion order: reads never promote an entry, and the
/// oldest inserted schema is dropped once capacity is exceeded. A poisoned
/// lock is recovered; every write leaves the entries and order consistent.
#[derive(Debug)]
pub struct SchemaCache {
    capacity: usize,
    inner: RwLock<CacheInner>,
}

impl SchemaCache {
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of schemas, at least 2
    ///
    /// # Returns
    /// `Err(SchemaError::InvalidCapacity)` if `capacity < 2`.
    pub fn new(capacity: usize) -> Result<Self, SchemaError> {
        if capacity < 2 {
            return Err(SchemaError::InvalidCapacity { capacity });
        }
        Ok(Self {
            capacity,
            inner: RwLock::new(CacheInner::default()),
        })
    }

    /// Returns the schema of `T`, building it on first use.
    pub fn get_or_build<T: Reflect>(&self) -> Result<Arc<TypeSchema>, SchemaError> {
        self.get_or_build_info(&T::type_info())
    }

    /// Returns the schema of the described type, building it on first use.
    ///
    /// The build runs without holding the lock. Concurrent builders of the
    /// same type converge on a single entry.
    pub fn get_or_build_info(&self, ty: &TypeInfo) -> Result<Arc<TypeSchema>, SchemaError> {
        if let Some(schema) = self.get(ty.id()) {
            return Ok(schema);
        }

        let schema = Arc::new(build_schema(ty)?);
        debug!(
            "Built schema for {} ({} fields, {} properties)",
            ty.name(),
            schema.fields().len(),
            schema.property_count()
        );

        let mut inner = self.write();
        if inner
            .entries
            .insert(ty.id(), Arc::clone(&schema))
            .is_none()
        {
            inner.order.push_back(ty.id());
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                if let Some(evicted) = inner.entries.remove(&oldest) {
                    debug!("Evicted schema for {}", evicted.name());
                }
            }
        }
        Ok(schema)
    }

    /// Returns a cached schema without building.
    pub fn get(&self, id: TypeId) -> Option<Arc<TypeSchema>> {
        self.read().entries.get(&id).cloned()
    }

    /// Checks if a schema is cached.
    pub fn contains(&self, id: TypeId) -> bool {
        self.read().entries.contains_key(&id)
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every cached schema.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.order.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmap_types::record;
    use std::thread;

    record! {
        #[derive(Debug, Clone, Default)]
        struct Ledger {
            pub id: i64,
        }
    }

    record! {
        #[derive(Debug, Clone, Default)]
        struct Other {
            pub name: String,
        }
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let cache = SchemaCache::new(4).unwrap();
        cache.get_or_build::<Ledger>().unwrap();

        let poisoned = thread::scope(|s| {
            s.spawn(|| {
                let _guard = cache.inner.write().unwrap();
                panic!("writer died holding the lock");
            })
            .join()
        });
        assert!(poisoned.is_err());
        assert!(cache.inner.is_poisoned());

        assert!(cache.get(TypeId::of::<Ledger>()).is_some());
        assert!(cache.contains(TypeId::of::<Ledger>()));
        assert_eq!(cache.len(), 1);
        cache.get_or_build::<Other>().unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
