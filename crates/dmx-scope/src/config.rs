//! Extension configuration

use crate::error::{ScopeError, ScopeResult};
use crate::registry::ServiceRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default namespace for scope keys
pub const DEFAULT_NAMESPACE: &str = "dmx::DomainModelScope";

/// Configuration for [`DomainModelExtension`](crate::DomainModelExtension)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Namespace prefixed to every scope key
    pub namespace: String,
    /// Hand new scopes to test instances that accept them
    pub inject_scope: bool,
    /// Settings for the registry the extension creates
    pub registry_settings: BTreeMap<String, String>,
}

impl ExtensionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// `ScopeError::Config` on malformed input or an empty namespace
    pub fn from_toml_str(input: &str) -> ScopeResult<Self> {
        let config: Self = toml::from_str(input)
            .map_err(|e| ScopeError::Config(format!("invalid extension config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants
    ///
    /// # Errors
    /// `ScopeError::Config` if the namespace is empty
    pub fn validate(&self) -> ScopeResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(ScopeError::Config("namespace must not be empty".to_string()));
        }
        Ok(())
    }

    /// With namespace
    #[inline]
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// With scope injection enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_inject_scope(mut self, inject_scope: bool) -> Self {
        self.inject_scope = inject_scope;
        self
    }

    /// With a registry setting
    #[inline]
    #[must_use]
    pub fn with_registry_setting(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.registry_settings.insert(name.into(), value.into());
        self
    }

    /// Build the registry described by `registry_settings`
    #[must_use]
    pub fn build_registry(&self) -> ServiceRegistry {
        ServiceRegistry::builder()
            .settings(self.registry_settings.clone())
            .build()
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            inject_scope: true,
            registry_settings: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExtensionConfig::new();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert!(config.inject_scope);
        assert!(config.registry_settings.is_empty());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = ExtensionConfig::from_toml_str(
            r#"
            inject_scope = false

            [registry_settings]
            "hibernate.dialect" = "H2"
            "#,
        )
        .unwrap();

        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert!(!config.inject_scope);
        assert_eq!(config.build_registry().setting("hibernate.dialect"), Some("H2"));
    }

    #[test]
    fn empty_namespace_is_rejected() {
        let result = ExtensionConfig::from_toml_str("namespace = \"  \"");
        assert!(matches!(result, Err(ScopeError::Config(_))));
    }

    #[test]
    fn builder_methods() {
        let config = ExtensionConfig::new()
            .with_namespace("custom")
            .with_inject_scope(false)
            .with_registry_setting("k", "v");

        assert_eq!(config.namespace, "custom");
        assert!(!config.inject_scope);
        assert_eq!(config.registry_settings.get("k").map(String::as_str), Some("v"));
    }
}
