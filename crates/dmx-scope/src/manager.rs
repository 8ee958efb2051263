//! Keyed scope storage
//!
//! Maps each [`ScopeKey`] to at most one live [`DomainModelScope`]:
//! - Find-or-create with an eager first build
//! - Lookup for dependent test code
//! - Detach on teardown
//!
//! Each key owns its own slot. The map's shard lock is only held long enough
//! to fetch or insert the slot, and a build only holds its own slot's build
//! mutex, so building the model for one test never blocks another test's key.
//! Lookups and statistics read the stored scope without taking any build
//! mutex.

use crate::error::ScopeResult;
use crate::producer::DomainModelProducer;
use crate::registry::ServiceRegistry;
use crate::scope::{DomainModelScope, ScopeKey};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Storage for one key
///
/// `build` is held for the whole first build; `scope` is only locked to read
/// or swap the stored handle.
#[derive(Debug, Default)]
struct Slot {
    build: Mutex<()>,
    scope: RwLock<Option<Arc<DomainModelScope>>>,
}

impl Slot {
    fn scope(&self) -> Option<Arc<DomainModelScope>> {
        self.scope.read().clone()
    }
}

/// Manager statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Keys holding a live scope
    pub live_scopes: usize,
    /// Keys with a slot allocated, including keys whose first build is
    /// still running
    pub slots: usize,
}

/// Process-wide store of domain model scopes
#[derive(Debug, Default)]
pub struct ScopeManager {
    slots: DashMap<ScopeKey, Arc<Slot>>,
}

impl ScopeManager {
    /// Create empty manager
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Return the scope stored for `key`, creating it if there is none
    ///
    /// A new scope builds its model before it is stored. Concurrent callers
    /// for the same key wait for that build and receive the same scope.
    ///
    /// # Errors
    /// The producer's failure during the first build; nothing is stored for
    /// `key` in that case and its slot is released
    pub fn get_or_create(
        &self,
        key: ScopeKey,
        producer: Arc<dyn DomainModelProducer>,
        registry: Arc<ServiceRegistry>,
    ) -> ScopeResult<Arc<DomainModelScope>> {
        loop {
            let slot = self.slot(&key);
            let _build = slot.build.lock();

            // Slot released by a failed build or teardown while we waited
            if !self.is_current(&key, &slot) {
                continue;
            }

            if let Some(existing) = slot.scope() {
                return Ok(existing);
            }

            tracing::debug!(key = %key, "creating domain model scope");
            let opened =
                DomainModelScope::open(key.clone(), Arc::clone(&registry), Arc::clone(&producer));
            match opened {
                Ok(scope) => {
                    let scope = Arc::new(scope);
                    *slot.scope.write() = Some(Arc::clone(&scope));
                    tracing::info!(key = %key, "domain model scope created");
                    return Ok(scope);
                }
                Err(e) => {
                    self.slots.remove_if(&key, |_, current| Arc::ptr_eq(current, &slot));
                    tracing::debug!(key = %key, error = %e, "domain model scope not created");
                    return Err(e);
                }
            }
        }
    }

    /// Scope stored for `key`, if any
    ///
    /// Never waits for a build in progress; a key whose first build is still
    /// running has no scope yet.
    #[must_use]
    pub fn find(&self, key: &ScopeKey) -> Option<Arc<DomainModelScope>> {
        self.slots.get(key).and_then(|entry| entry.value().scope())
    }

    /// Check if a scope is stored for `key`
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ScopeKey) -> bool {
        self.find(key).is_some()
    }

    /// Detach the scope stored for `key`
    ///
    /// The scope is returned as-is; closing it is up to the caller.
    ///
    /// Must not race a [`get_or_create`](Self::get_or_create) for the same
    /// key: the host only tears a unit down after its setup returned. If it
    /// does race, the creator may receive a scope that is no longer stored.
    pub fn remove(&self, key: &ScopeKey) -> Option<Arc<DomainModelScope>> {
        let (_, slot) = self.slots.remove(key)?;
        let scope = slot.scope.write().take();
        scope
    }

    /// Close and detach every stored scope
    ///
    /// Returns the number of scopes closed. Same restriction as
    /// [`remove`](Self::remove): no `get_or_create` may be in flight.
    pub fn close_all(&self) -> usize {
        let keys: Vec<ScopeKey> = self.slots.iter().map(|entry| entry.key().clone()).collect();

        let mut closed = 0;
        for key in keys {
            if let Some(scope) = self.remove(&key) {
                scope.close();
                closed += 1;
            }
        }

        if closed > 0 {
            tracing::info!(closed, "closed all domain model scopes");
        }
        closed
    }

    /// Number of live scopes
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats().live_scopes
    }

    /// Check if no scope is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Manager statistics
    ///
    /// Does not wait for builds in progress.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let slots: Vec<Arc<Slot>> = self
            .slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        ManagerStats {
            live_scopes: slots.iter().filter(|slot| slot.scope.read().is_some()).count(),
            slots: slots.len(),
        }
    }

    fn slot(&self, key: &ScopeKey) -> Arc<Slot> {
        // Clone the Arc out so the shard lock is released before building.
        Arc::clone(self.slots.entry(key.clone()).or_default().value())
    }

    fn is_current(&self, key: &ScopeKey, slot: &Arc<Slot>) -> bool {
        self.slots
            .get(key)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), slot))
    }
}
