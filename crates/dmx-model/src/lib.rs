//! DMX Model
//!
//! The domain model artifact handed out by a scope, the contract of the
//! aggregator that builds it, and the cache-strategy post-processing step.
//!
//! # Core Concepts
//!
//! - [`DomainModel`]: Built model graph exposing entity and collection bindings
//! - [`EntityBinding`] / [`CollectionBinding`]: Graph nodes carrying cache settings
//! - [`ModelSources`]: Aggregator seam (packages, classes, resources, imports)
//! - [`DomainModelDescriptor`]: Reusable bundle of contributions
//! - [`apply_cache_settings`]: Tags eligible bindings with a concurrency strategy
//!
//! # Example
//!
//! ```rust,ignore
//! use dmx_model::{apply_cache_settings, DomainModel};
//!
//! let mut model: DomainModel = sources.build()?;
//! let report = apply_cache_settings(&mut model, true, "read-write");
//! println!("cached {} entities", report.entities_cached);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod binding;
mod cache;
mod error;
mod model;
mod sources;

// Re-exports
pub use binding::{CollectionBinding, EntityBinding, PropertyBinding, SimpleValue, Value};
pub use cache::{apply_cache_settings, is_lob, CacheApplyReport, LOB_TYPE_NAMES};
pub use error::{DescriptorError, SourcesError, SourcesResult};
pub use model::{DomainModel, ModelId};
pub use sources::{
    ClassRef, DescriptorFactory, DescriptorRegistry, DomainModelDescriptor, ModelSources,
    QueryImport, StandardDomainModel, StandardModelDescriptor,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
