//! Domain model scope
//!
//! A scope owns the cached model of exactly one test unit.
//!
//! ```text
//!                 build                    close
//! ActiveEmpty ─────────────▶ ActivePopulated ─────▶ Closed
//!      ▲  │                        │                  ▲
//!      │  └──────── close ─────────┼──────────────────┘
//!      └────────── invalidate ─────┘
//! ```
//!
//! `Closed` is terminal: every operation except `close` fails with
//! [`ScopeError::Inactive`].

use crate::error::{ScopeError, ScopeResult};
use crate::producer::DomainModelProducer;
use crate::registry::ServiceRegistry;
use dmx_model::DomainModel;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of one test unit within an extension namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeKey {
    namespace: String,
    unit: String,
}

impl ScopeKey {
    /// Create scope key
    #[inline]
    #[must_use]
    pub fn new(namespace: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            unit: unit.into(),
        }
    }

    /// Extension namespace
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Test unit identity
    #[inline]
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace, self.unit)
    }
}

/// Observable lifecycle phase of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopePhase {
    /// Active, no model cached
    ActiveEmpty,
    /// Active, model cached
    ActivePopulated,
    /// Closed (terminal)
    Closed,
}

impl ScopePhase {
    /// Whether the scope still accepts operations
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug)]
enum ScopeState {
    Active(Option<Arc<DomainModel>>),
    Closed,
}

/// Lifecycle-bound holder of one cached domain model
///
/// Hands out the model as `Arc<DomainModel>`: repeated calls return the same
/// instance until the scope is invalidated. A rebuild never touches models
/// handed out earlier.
pub struct DomainModelScope {
    key: ScopeKey,
    registry: Arc<ServiceRegistry>,
    producer: Arc<dyn DomainModelProducer>,
    state: Mutex<ScopeState>,
}

impl DomainModelScope {
    /// Create an active scope with no model built yet
    #[must_use]
    pub fn new(
        key: ScopeKey,
        registry: Arc<ServiceRegistry>,
        producer: Arc<dyn DomainModelProducer>,
    ) -> Self {
        Self {
            key,
            registry,
            producer,
            state: Mutex::new(ScopeState::Active(None)),
        }
    }

    /// Create an active scope and build its model immediately
    ///
    /// # Errors
    /// Propagates the producer's failure; no scope is returned in that case
    pub fn open(
        key: ScopeKey,
        registry: Arc<ServiceRegistry>,
        producer: Arc<dyn DomainModelProducer>,
    ) -> ScopeResult<Self> {
        let scope = Self::new(key, registry, producer);
        scope.domain_model()?;
        Ok(scope)
    }

    /// Cached model, building it first if the scope is empty
    ///
    /// # Errors
    /// - `ScopeError::Inactive` if the scope was closed
    /// - the producer's failure; the scope then stays empty
    pub fn domain_model(&self) -> ScopeResult<Arc<DomainModel>> {
        let mut state = self.state.lock();
        let ScopeState::Active(slot) = &mut *state else {
            return Err(ScopeError::Inactive(self.key.clone()));
        };

        if let Some(model) = slot {
            return Ok(Arc::clone(model));
        }

        tracing::debug!(key = %self.key, "building domain model");
        let model = Arc::new(self.producer.produce_model(&self.registry)?);
        tracing::info!(
            key = %self.key,
            model = %model.id(),
            entities = model.entity_count(),
            collections = model.collection_count(),
            "domain model built"
        );

        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Drop the cached model; the next [`domain_model`](Self::domain_model)
    /// call rebuilds it
    ///
    /// # Errors
    /// `ScopeError::Inactive` if the scope was closed
    pub fn invalidate(&self) -> ScopeResult<()> {
        let mut state = self.state.lock();
        match &mut *state {
            ScopeState::Active(slot) => {
                if let Some(model) = slot.take() {
                    tracing::debug!(key = %self.key, model = %model.id(), "domain model released");
                }
                Ok(())
            }
            ScopeState::Closed => Err(ScopeError::Inactive(self.key.clone())),
        }
    }

    /// Close the scope permanently, releasing the model
    ///
    /// Closing a closed scope does nothing.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if matches!(*state, ScopeState::Active(_)) {
            *state = ScopeState::Closed;
            tracing::debug!(key = %self.key, "domain model scope closed");
        }
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> ScopePhase {
        match &*self.state.lock() {
            ScopeState::Active(None) => ScopePhase::ActiveEmpty,
            ScopeState::Active(Some(_)) => ScopePhase::ActivePopulated,
            ScopeState::Closed => ScopePhase::Closed,
        }
    }

    /// Whether the scope is still active
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase().is_active()
    }

    /// Scope key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ScopeKey {
        &self.key
    }

    /// Registry handed to the producer
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }
}

impl fmt::Debug for DomainModelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainModelScope")
            .field("key", &self.key)
            .field("registry", &self.registry.id())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
