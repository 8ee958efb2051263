//! Error types for DMX scopes
//!
//! Provides error handling for:
//! - Use of a scope after it was closed
//! - Missing or unresolvable declarative specifications
//! - Descriptor instantiation failures
//! - Pass-through failures from the model-source aggregator

use crate::scope::ScopeKey;
use dmx_model::{DescriptorError, SourcesError};

/// Main scope error type
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// Scope was closed; no model can be created or accessed
    #[error("domain model scope no longer active: {0}")]
    Inactive(ScopeKey),

    /// No declarative specification attached to the test element
    #[error("could not locate domain model specification for {element}")]
    SpecificationMissing {
        /// Element the spec was looked up for
        element: String,
    },

    /// Extension context does not identify a test element
    #[error("unable to determine how to handle extension context: {0}")]
    UnresolvableContext(String),

    /// Custom descriptor could not be instantiated
    #[error("error instantiating domain model descriptor '{descriptor}'")]
    DescriptorInstantiation {
        /// Descriptor name as written in the specification
        descriptor: String,
        /// Underlying failure
        #[source]
        source: DescriptorError,
    },

    /// Aggregator rejected a contribution or failed to build
    #[error("model sources error: {0}")]
    Sources(#[from] SourcesError),

    /// Test-supplied producer failed
    #[error("model producer failed: {0}")]
    Producer(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ScopeError {
    /// Create descriptor instantiation error
    #[inline]
    pub fn descriptor_instantiation(
        descriptor: impl Into<String>,
        source: DescriptorError,
    ) -> Self {
        Self::DescriptorInstantiation {
            descriptor: descriptor.into(),
            source,
        }
    }

    /// Create producer error from a message or any error value
    #[inline]
    pub fn producer(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Producer(source.into())
    }

    /// Check if the error stems from using a closed scope
    #[inline]
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Self::Inactive(_))
    }

    /// Check if the error is a programming or configuration error
    ///
    /// Such errors will fail again on every attempt; only aggregator and
    /// producer failures depend on the state of the sources.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Sources(_) | Self::Producer(_))
    }
}

/// Result type alias for scope operations
pub type ScopeResult<T> = Result<T, ScopeError>;
