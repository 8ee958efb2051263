//! Error types for model sources and descriptors
//!
//! Provides error handling for:
//! - Contributions rejected by a model-source aggregator
//! - Building the model from collected sources
//! - Resolving and instantiating model descriptors

/// Errors raised by a [`ModelSources`](crate::ModelSources) implementation
#[derive(Debug, thiserror::Error)]
pub enum SourcesError {
    /// Class could not be resolved
    #[error("unknown class: '{0}'")]
    UnknownClass(String),

    /// Package could not be resolved
    #[error("unknown package: '{0}'")]
    UnknownPackage(String),

    /// Mapping resource not found
    #[error("mapping resource not found: {0}")]
    ResourceNotFound(String),

    /// Query import name already bound to another class
    #[error("query import '{name}' already bound to {existing}")]
    DuplicateImport { name: String, existing: String },

    /// Model build failed
    #[error("model build failed: {0}")]
    Build(String),
}

impl SourcesError {
    /// Create duplicate import error
    pub fn duplicate_import(name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::DuplicateImport {
            name: name.into(),
            existing: existing.into(),
        }
    }
}

/// Errors resolving or instantiating a [`DomainModelDescriptor`](crate::DomainModelDescriptor)
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// No factory registered under this name
    #[error("no descriptor registered as '{0}'")]
    Unregistered(String),

    /// Factory failed to construct the descriptor
    #[error("descriptor construction failed: {0}")]
    Construction(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DescriptorError {
    /// Wrap a construction failure
    pub fn construction(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Construction(source.into())
    }
}

/// Result type alias for model-source operations
pub type SourcesResult<T> = Result<T, SourcesError>;
