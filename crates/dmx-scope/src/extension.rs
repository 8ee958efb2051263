//! Lifecycle extension driving domain model scopes
//!
//! The host test runner calls three hooks:
//!
//! | Hook                              | Effect                                   |
//! |-----------------------------------|------------------------------------------|
//! | `post_process_test_instance`      | find or create the unit's scope          |
//! | `handle_test_execution_error`     | invalidate the scope, hand error back    |
//! | `after_all`                       | detach and close the scope               |

use crate::config::ExtensionConfig;
use crate::error::{ScopeError, ScopeResult};
use crate::manager::ScopeManager;
use crate::producer::DomainModelProducer;
use crate::scope::{DomainModelScope, ScopeKey};
use crate::spec::SpecificationLookup;
use crate::spec_producer::{SourcesFactory, SpecDrivenProducer};
use dmx_model::DescriptorRegistry;
use std::fmt;
use std::sync::Arc;

/// What the host knows about the test unit a hook runs for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionContext {
    unique_id: String,
    display_name: String,
    element: Option<String>,
}

impl ExtensionContext {
    /// Context for a test class
    #[must_use]
    pub fn for_class(unique_id: impl Into<String>, class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self {
            unique_id: unique_id.into(),
            display_name: class_name.clone(),
            element: Some(class_name),
        }
    }

    /// Context not bound to any test element
    #[must_use]
    pub fn detached(unique_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            display_name: display_name.into(),
            element: None,
        }
    }

    /// Unique id of the test unit
    #[inline]
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Human-readable name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Test element (class) the spec is attached to
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }
}

/// Test instance as seen by the extension
///
/// Both methods are optional capabilities: an instance that supplies its own
/// producer bypasses the declarative spec, and an instance that wants the
/// scope receives it once it is created.
pub trait TestInstance: Send + Sync {
    /// Producer supplied by the test itself
    fn model_producer(&self) -> Option<Arc<dyn DomainModelProducer>> {
        None
    }

    /// Receive the newly created scope
    fn inject_model_scope(&self, _scope: Arc<DomainModelScope>) {}
}

/// Extension managing one domain model scope per test unit
pub struct DomainModelExtension {
    config: ExtensionConfig,
    manager: Arc<ScopeManager>,
    specs: Arc<dyn SpecificationLookup>,
    descriptors: Arc<DescriptorRegistry>,
    sources: Arc<dyn SourcesFactory>,
}

impl DomainModelExtension {
    /// Create extension with its own scope storage and no custom descriptors
    ///
    /// # Errors
    /// `ScopeError::Config` if `config` is invalid
    pub fn new(
        config: ExtensionConfig,
        specs: Arc<dyn SpecificationLookup>,
        sources: Arc<dyn SourcesFactory>,
    ) -> ScopeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            manager: Arc::new(ScopeManager::new()),
            specs,
            descriptors: Arc::new(DescriptorRegistry::new()),
            sources,
        })
    }

    /// With custom descriptors available to specs
    #[inline]
    #[must_use]
    pub fn with_descriptors(mut self, descriptors: DescriptorRegistry) -> Self {
        self.descriptors = Arc::new(descriptors);
        self
    }

    /// With shared scope storage
    #[inline]
    #[must_use]
    pub fn with_manager(mut self, manager: Arc<ScopeManager>) -> Self {
        self.manager = manager;
        self
    }

    /// Hook: test instance ready
    ///
    /// Returns the unit's scope, creating it (and building its model) if
    /// needed.
    ///
    /// # Errors
    /// - `ScopeError::UnresolvableContext` if no producer is supplied and the
    ///   context has no element
    /// - `ScopeError::SpecificationMissing` if no spec is attached
    /// - any failure of the first build
    pub fn post_process_test_instance(
        &self,
        instance: &dyn TestInstance,
        context: &ExtensionContext,
    ) -> ScopeResult<Arc<DomainModelScope>> {
        let key = self.scope_key(context);
        if let Some(existing) = self.manager.find(&key) {
            return Ok(existing);
        }

        let producer = match instance.model_producer() {
            Some(producer) => producer,
            None => self.spec_producer(context)?,
        };

        let registry = Arc::new(self.config.build_registry());
        let scope = self.manager.get_or_create(key, producer, registry)?;

        if self.config.inject_scope {
            instance.inject_model_scope(Arc::clone(&scope));
        }
        Ok(scope)
    }

    /// Hook: test unit complete
    ///
    /// Detaches and closes the unit's scope. Does nothing if none exists.
    pub fn after_all(&self, context: &ExtensionContext) {
        let key = self.scope_key(context);
        if let Some(scope) = self.manager.remove(&key) {
            scope.close();
            tracing::info!(key = %key, "domain model scope released");
        }
    }

    /// Hook: test execution failed
    ///
    /// Invalidates the unit's scope so nothing built before the failure is
    /// reused, then returns `error` unchanged.
    ///
    /// # Errors
    /// Always returns `Err(error)`
    pub fn handle_test_execution_error<E>(
        &self,
        context: &ExtensionContext,
        error: E,
    ) -> Result<(), E> {
        let key = self.scope_key(context);
        if let Some(scope) = self.manager.find(&key) {
            match scope.invalidate() {
                Ok(()) => {
                    tracing::debug!(key = %key, "domain model invalidated after test failure");
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "could not invalidate domain model");
                }
            }
        }
        Err(error)
    }

    /// Scope of the unit, if one exists
    #[must_use]
    pub fn find_domain_model_scope(
        &self,
        context: &ExtensionContext,
    ) -> Option<Arc<DomainModelScope>> {
        self.manager.find(&self.scope_key(context))
    }

    /// Key under which the unit's scope is stored
    #[must_use]
    pub fn scope_key(&self, context: &ExtensionContext) -> ScopeKey {
        ScopeKey::new(self.config.namespace.as_str(), context.unique_id())
    }

    /// Scope storage
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &Arc<ScopeManager> {
        &self.manager
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    fn spec_producer(
        &self,
        context: &ExtensionContext,
    ) -> ScopeResult<Arc<dyn DomainModelProducer>> {
        let element = context
            .element()
            .ok_or_else(|| ScopeError::UnresolvableContext(context.display_name().to_string()))?;

        let spec = self
            .specs
            .find_domain_model(element)
            .ok_or_else(|| ScopeError::SpecificationMissing {
                element: element.to_string(),
            })?;

        Ok(Arc::new(SpecDrivenProducer::new(
            spec,
            Arc::clone(&self.descriptors),
            Arc::clone(&self.sources),
        )))
    }
}

impl fmt::Debug for DomainModelExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainModelExtension")
            .field("config", &self.config)
            .field("manager", &self.manager.stats())
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}
