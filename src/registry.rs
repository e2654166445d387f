//! Process-wide storage for data computed once per type.
//!
//! Entries are created on first use and live until the process
//! exits. Building happens outside the lock, so concurrent first
//! uses may build the same entry more than once, but only the first
//! one to take the write lock is published. Every caller gets the
//! published reference.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use tracing::trace;

type Entry = &'static (dyn Any + Send + Sync);

static REGISTRY: Lazy<RwLock<HashMap<TypeId, Entry>>> = Lazy::new(Default::default);

/// Returns the process-wide instance of `D`, calling `build` if none
/// has been published yet.
///
/// The returned reference is the same for every call with the same
/// `D`.
pub fn cached<D: Any + Send + Sync>(build: fn() -> D) -> &'static D {
    let id = TypeId::of::<D>();
    let found = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();

    let entry = match found {
        Some(entry) => entry,
        None => {
            let built = build();
            let mut entries = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);

            *entries.entry(id).or_insert_with(|| {
                trace!(entry = std::any::type_name::<D>(), "published cache entry");

                let leaked: Entry = Box::leak(Box::new(built));
                leaked
            })
        }
    };

    match entry.downcast_ref::<D>() {
        Some(d) => d,
        None => unreachable!("registry entries are keyed by their own TypeId"),
    }
}
