//! Declarative domain model specification
//!
//! What a test declares about the model it needs: packages, bundles,
//! descriptors, classes, mapping resources, query imports and a cache
//! override. The host resolves a spec per test element through a
//! [`SpecificationLookup`].

use crate::error::{ScopeError, ScopeResult};
use dashmap::DashMap;
use dmx_model::{ClassRef, QueryImport, StandardDomainModel};
use serde::{Deserialize, Serialize};

/// Declarative description of a test's domain model
///
/// Every field is optional when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainModelSpec {
    /// Packages to scan
    pub annotated_package_names: Vec<String>,
    /// Bundled standard models
    pub standard_models: Vec<StandardDomainModel>,
    /// Names of custom descriptors (resolved through a descriptor registry)
    pub model_descriptor_classes: Vec<String>,
    /// Annotated classes
    pub annotated_classes: Vec<ClassRef>,
    /// Annotated classes referenced by name only
    pub annotated_class_names: Vec<String>,
    /// External mapping resources
    pub xml_mappings: Vec<String>,
    /// Query imports under explicit names
    pub extra_query_imports: Vec<QueryImport>,
    /// Classes imported under their simple name
    pub extra_query_import_classes: Vec<ClassRef>,
    /// Whether to force a cache concurrency strategy onto the model
    pub override_cache_strategy: bool,
    /// Strategy forced when `override_cache_strategy` is set
    pub concurrency_strategy: String,
}

impl DomainModelSpec {
    /// Create empty spec
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// `ScopeError::Config` on malformed input
    pub fn from_toml_str(input: &str) -> ScopeResult<Self> {
        toml::from_str(input)
            .map_err(|e| ScopeError::Config(format!("invalid domain model spec: {e}")))
    }

    /// Parse from JSON
    ///
    /// # Errors
    /// `ScopeError::Config` on malformed input
    pub fn from_json_str(input: &str) -> ScopeResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ScopeError::Config(format!("invalid domain model spec: {e}")))
    }

    /// With an annotated package
    #[inline]
    #[must_use]
    pub fn with_package(mut self, package_name: impl Into<String>) -> Self {
        self.annotated_package_names.push(package_name.into());
        self
    }

    /// With a standard model bundle
    #[inline]
    #[must_use]
    pub fn with_standard_model(mut self, model: StandardDomainModel) -> Self {
        self.standard_models.push(model);
        self
    }

    /// With a custom descriptor
    #[inline]
    #[must_use]
    pub fn with_descriptor(mut self, name: impl Into<String>) -> Self {
        self.model_descriptor_classes.push(name.into());
        self
    }

    /// With an annotated class
    #[inline]
    #[must_use]
    pub fn with_class(mut self, class: impl Into<ClassRef>) -> Self {
        self.annotated_classes.push(class.into());
        self
    }

    /// With an annotated class name
    #[inline]
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.annotated_class_names.push(class_name.into());
        self
    }

    /// With a mapping resource
    #[inline]
    #[must_use]
    pub fn with_xml_mapping(mut self, resource: impl Into<String>) -> Self {
        self.xml_mappings.push(resource.into());
        self
    }

    /// With a named query import
    #[inline]
    #[must_use]
    pub fn with_query_import(mut self, import: QueryImport) -> Self {
        self.extra_query_imports.push(import);
        self
    }

    /// With a class imported under its simple name
    #[inline]
    #[must_use]
    pub fn with_query_import_class(mut self, class: impl Into<ClassRef>) -> Self {
        self.extra_query_import_classes.push(class.into());
        self
    }

    /// With a forced cache concurrency strategy
    #[inline]
    #[must_use]
    pub fn with_cache_override(mut self, strategy: impl Into<String>) -> Self {
        self.override_cache_strategy = true;
        self.concurrency_strategy = strategy.into();
        self
    }
}

/// Resolves the spec attached to a test element
pub trait SpecificationLookup: Send + Sync {
    /// Spec for `element` (usually the test class name), if one is attached
    fn find_domain_model(&self, element: &str) -> Option<DomainModelSpec>;
}

/// Concurrent element → spec catalog
#[derive(Debug, Default)]
pub struct SpecCatalog {
    specs: DashMap<String, DomainModelSpec>,
}

impl SpecCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            specs: DashMap::new(),
        }
    }

    /// Attach `spec` to `element`, returning the spec it replaces
    pub fn attach(
        &self,
        element: impl Into<String>,
        spec: DomainModelSpec,
    ) -> Option<DomainModelSpec> {
        self.specs.insert(element.into(), spec)
    }

    /// Detach the spec of `element`
    pub fn detach(&self, element: &str) -> Option<DomainModelSpec> {
        self.specs.remove(element).map(|(_, spec)| spec)
    }

    /// Number of attached specs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl SpecificationLookup for SpecCatalog {
    fn find_domain_model(&self, element: &str) -> Option<DomainModelSpec> {
        self.specs.get(element).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn toml_fields_default_when_absent() {
        let spec = DomainModelSpec::from_toml_str(
            r#"
            standard_models = ["animal", "contacts"]
            override_cache_strategy = true
            concurrency_strategy = "read-write"
            "#,
        )
        .unwrap();

        assert_eq!(
            spec,
            DomainModelSpec::new()
                .with_standard_model(StandardDomainModel::Animal)
                .with_standard_model(StandardDomainModel::Contacts)
                .with_cache_override("read-write")
        );
    }

    #[test]
    fn toml_reads_imports_and_classes() {
        let spec = DomainModelSpec::from_toml_str(
            r#"
            annotated_classes = ["org.example.Order", "org.example.Customer"]
            extra_query_import_classes = ["org.example.reports.Summary"]

            [[extra_query_imports]]
            name = "Line"
            imported_class = "org.example.OrderLine"
            "#,
        )
        .unwrap();

        assert_eq!(spec.annotated_classes.len(), 2);
        assert_eq!(
            spec.extra_query_imports,
            vec![QueryImport::new("Line", "org.example.OrderLine")]
        );
        assert_eq!(spec.extra_query_import_classes[0].simple_name(), "Summary");
        assert!(!spec.override_cache_strategy);
    }

    #[test]
    fn json_is_accepted() {
        let spec = DomainModelSpec::from_json_str(r#"{"xml_mappings": ["orm.xml"]}"#).unwrap();
        assert_eq!(spec.xml_mappings, vec!["orm.xml".to_string()]);
    }

    #[test]
    fn malformed_input_is_config_error() {
        let result = DomainModelSpec::from_toml_str("standard_models = [\"not-a-model\"]");
        assert!(matches!(result, Err(ScopeError::Config(_))));
    }

    #[test]
    fn catalog_lookup() {
        let catalog = SpecCatalog::new();
        catalog.attach("OrderTests", DomainModelSpec::new().with_class("org.example.Order"));

        assert!(catalog.find_domain_model("OrderTests").is_some());
        assert!(catalog.find_domain_model("Other").is_none());
        assert_eq!(catalog.len(), 1);

        catalog.detach("OrderTests");
        assert!(catalog.is_empty());
    }
}
