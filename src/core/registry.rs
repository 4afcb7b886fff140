//! Process-wide cache of property collections.
//!
//! Statically declared types are keyed by their `TypeId`; every collection is
//! also bound to its model type name so blobs and schema references can find
//! it. A name belongs to one collection for the life of the process: binding a
//! different collection to a taken name is a schema error.
//!
//! Entries are created lazily on first use and never change afterwards.
//! Two threads racing on the first use of a type may both compute the
//! collection; the computation is deterministic, the first insert wins and
//! both callers end up sharing the stored `Arc`.

use crate::domain::collection::PropertyCollection;
use crate::domain::ports::Schema;
use crate::utils::error::{ModelError, Result};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Collections {
    by_name: HashMap<String, Arc<PropertyCollection>>,
    by_type: HashMap<TypeId, Arc<PropertyCollection>>,
}

fn collections() -> &'static RwLock<Collections> {
    static COLLECTIONS: OnceLock<RwLock<Collections>> = OnceLock::new();
    COLLECTIONS.get_or_init(|| RwLock::new(Collections::default()))
}

fn read() -> RwLockReadGuard<'static, Collections> {
    collections().read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Collections> {
    collections().write().unwrap_or_else(PoisonError::into_inner)
}

fn conflict(name: &str) -> ModelError {
    ModelError::schema(format!(
        "Model '{}' is already registered with different properties",
        name
    ))
}

impl Collections {
    fn check(&self, collection: &PropertyCollection) -> Result<Option<Arc<PropertyCollection>>> {
        match self.by_name.get(collection.name()) {
            Some(existing) if **existing == *collection => Ok(Some(existing.clone())),
            Some(_) => Err(conflict(collection.name())),
            None => Ok(None),
        }
    }

    fn bind(&mut self, collection: PropertyCollection) -> Result<Arc<PropertyCollection>> {
        if let Some(existing) = self.check(&collection)? {
            return Ok(existing);
        }
        let stored = Arc::new(collection);
        self.by_name.insert(stored.name().to_string(), stored.clone());
        Ok(stored)
    }
}

/// Returns the collection registered under `name`, if any.
pub fn lookup(name: &str) -> Option<Arc<PropertyCollection>> {
    read().by_name.get(name).cloned()
}

/// Returns the collection for a statically declared type, computing and
/// caching it on first use.
///
/// Fails when another type or a runtime definition already holds
/// `T::NAME` with different properties.
pub fn resolve<T: Schema>() -> Result<Arc<PropertyCollection>> {
    let type_id = TypeId::of::<T>();
    if let Some(existing) = read().by_type.get(&type_id) {
        return Ok(existing.clone());
    }

    tracing::debug!("Computing property collection for model '{}'", T::NAME);
    let computed = PropertyCollection::new(T::NAME, T::declare())?;

    let mut guard = write();
    if let Some(existing) = guard.by_type.get(&type_id) {
        return Ok(existing.clone());
    }
    let stored = guard.bind(computed)?;
    guard.by_type.insert(type_id, stored.clone());
    Ok(stored)
}

/// Registers a collection built at runtime, e.g. from a schema file.
///
/// Registering a collection equal to the stored one is a no-op; a different
/// collection under an already registered name is rejected.
pub fn register(collection: PropertyCollection) -> Result<Arc<PropertyCollection>> {
    tracing::debug!(
        "Registering model '{}' with {} properties",
        collection.name(),
        collection.count()
    );
    write().bind(collection)
}

/// Registers several collections at once. Nothing is registered unless every
/// collection can be.
pub fn register_all(
    collections: Vec<PropertyCollection>,
) -> Result<Vec<Arc<PropertyCollection>>> {
    let mut guard = write();

    let mut batch: HashMap<&str, &PropertyCollection> = HashMap::new();
    for collection in &collections {
        guard.check(collection)?;
        if let Some(previous) = batch.insert(collection.name(), collection) {
            if previous != collection {
                return Err(conflict(collection.name()));
            }
        }
    }

    collections
        .into_iter()
        .map(|collection| guard.bind(collection))
        .collect()
}
