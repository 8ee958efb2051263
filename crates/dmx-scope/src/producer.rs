//! Domain model producer capability

use crate::error::ScopeResult;
use crate::registry::ServiceRegistry;
use dmx_model::DomainModel;

/// Builds one domain model from a registry
///
/// Producers hold no model state: every call builds a fresh model and the
/// caller takes ownership of it. Closures of the matching shape are
/// producers too.
///
/// # Re-entrance
///
/// A producer runs while its scope's state lock is held, and during a first
/// build also while its key's build lock in [`ScopeManager`] is held. It may
/// call [`ScopeManager::find`], [`ScopeManager::len`] or
/// [`ScopeManager::stats`], which never wait on builds. It must not call
/// [`ScopeManager::get_or_create`] for its own key, or any method of the
/// scope it is building for; both deadlock.
///
/// [`ScopeManager`]: crate::ScopeManager
/// [`ScopeManager::find`]: crate::ScopeManager::find
/// [`ScopeManager::len`]: crate::ScopeManager::len
/// [`ScopeManager::stats`]: crate::ScopeManager::stats
/// [`ScopeManager::get_or_create`]: crate::ScopeManager::get_or_create
///
/// # Example
/// ```rust,ignore
/// let producer = |_registry: &ServiceRegistry| -> ScopeResult<DomainModel> {
///     Ok(DomainModel::new())
/// };
/// let scope = manager.get_or_create(key, Arc::new(producer), registry)?;
/// ```
pub trait DomainModelProducer: Send + Sync {
    /// Produce a new model
    ///
    /// # Errors
    /// Any failure building the model; it is propagated untouched to the
    /// scope operation that triggered the build
    fn produce_model(&self, registry: &ServiceRegistry) -> ScopeResult<DomainModel>;
}

impl<F> DomainModelProducer for F
where
    F: Fn(&ServiceRegistry) -> ScopeResult<DomainModel> + Send + Sync,
{
    fn produce_model(&self, registry: &ServiceRegistry) -> ScopeResult<DomainModel> {
        self(registry)
    }
}
