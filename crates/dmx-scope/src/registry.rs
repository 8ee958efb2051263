//! Service registry handle passed to producers
//!
//! Scopes never look inside the registry; they only hand the same instance
//! back to the producer on every (re)build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique registry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryId(pub Uuid);

impl RegistryId {
    /// Generate new registry ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RegistryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque service registry built from settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistry {
    id: RegistryId,
    settings: BTreeMap<String, String>,
}

impl ServiceRegistry {
    /// Start building a registry
    #[inline]
    #[must_use]
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    /// Registry identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Look up a setting
    #[inline]
    #[must_use]
    pub fn setting(&self, name: &str) -> Option<&str> {
        self.settings.get(name).map(String::as_str)
    }

    /// All settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &BTreeMap<String, String> {
        &self.settings
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServiceRegistry`]
#[derive(Debug, Default)]
pub struct ServiceRegistryBuilder {
    settings: BTreeMap<String, String>,
}

impl ServiceRegistryBuilder {
    /// With a single setting
    #[inline]
    #[must_use]
    pub fn setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(name.into(), value.into());
        self
    }

    /// With several settings
    #[must_use]
    pub fn settings<I, K, V>(mut self, settings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.settings
            .extend(settings.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> ServiceRegistry {
        ServiceRegistry {
            id: RegistryId::new(),
            settings: self.settings,
        }
    }
}
