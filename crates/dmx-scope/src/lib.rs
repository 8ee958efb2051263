//! DMX Scope
//!
//! One cached domain model per test unit, built on scope creation, rebuilt
//! after invalidation and released when the unit completes.
//!
//! # Core Operations
//!
//! - **Create**: [`ScopeManager::get_or_create`] finds or builds the unit's scope
//! - **Access**: [`DomainModelScope::domain_model`] returns the cached model
//! - **Invalidate**: [`DomainModelScope::invalidate`] drops the model, keeps the scope
//! - **Close**: [`DomainModelScope::close`] ends the scope for good
//!
//! # Architecture
//!
//! ```text
//! host hooks → DomainModelExtension → ScopeManager ─┬─ DomainModelScope ─→ DomainModelProducer
//!                                                   └─ (one slot per ScopeKey)       │
//!                                                              SpecDrivenProducer ←──┘
//!                                                              ModelSources + cache settings
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use dmx_scope::prelude::*;
//!
//! let extension = DomainModelExtension::new(ExtensionConfig::new(), specs, sources)?;
//! let context = ExtensionContext::for_class("[class:OrderTests]", "OrderTests");
//!
//! let scope = extension.post_process_test_instance(&instance, &context)?;
//! let model = scope.domain_model()?;
//!
//! extension.after_all(&context);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod extension;
pub mod manager;
pub mod producer;
pub mod registry;
pub mod scope;
pub mod spec;
pub mod spec_producer;

// Re-exports for convenience
pub use config::{ExtensionConfig, DEFAULT_NAMESPACE};
pub use error::{ScopeError, ScopeResult};
pub use extension::{DomainModelExtension, ExtensionContext, TestInstance};
pub use manager::{ManagerStats, ScopeManager};
pub use producer::DomainModelProducer;
pub use registry::{RegistryId, ServiceRegistry, ServiceRegistryBuilder};
pub use scope::{DomainModelScope, ScopeKey, ScopePhase};
pub use spec::{DomainModelSpec, SpecCatalog, SpecificationLookup};
pub use spec_producer::{SourcesFactory, SpecDrivenProducer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with DMX scopes
    pub use crate::config::ExtensionConfig;
    pub use crate::error::{ScopeError, ScopeResult};
    pub use crate::extension::{DomainModelExtension, ExtensionContext, TestInstance};
    pub use crate::manager::ScopeManager;
    pub use crate::producer::DomainModelProducer;
    pub use crate::registry::ServiceRegistry;
    pub use crate::scope::{DomainModelScope, ScopeKey, ScopePhase};
    pub use crate::spec::{DomainModelSpec, SpecCatalog, SpecificationLookup};
    pub use crate::spec_producer::{SourcesFactory, SpecDrivenProducer};
    pub use dmx_model::{DomainModel, StandardDomainModel};
}
