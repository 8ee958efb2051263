//! Model-source aggregation contract
//!
//! The aggregator that turns packages, classes and mapping resources into a
//! [`DomainModel`] lives outside this crate. This module defines the seam it
//! plugs into, plus the descriptor types contributions are expressed with.

use crate::error::{DescriptorError, SourcesResult};
use crate::model::DomainModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Fully-qualified reference to a mapped class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassRef(String);

impl ClassRef {
    /// Create class reference
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Fully-qualified name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Name without package or enclosing class (`a.b.Outer$Inner` → `Inner`)
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit(['.', '$']).next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Query import under an explicit name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryImport {
    /// Name usable in queries
    pub name: String,
    /// Class the name resolves to
    pub imported_class: ClassRef,
}

impl QueryImport {
    /// Create query import
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, imported_class: impl Into<ClassRef>) -> Self {
        Self {
            name: name.into(),
            imported_class: imported_class.into(),
        }
    }
}

/// Bundled, ready-made domain models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardDomainModel {
    /// Animal hierarchy (inheritance-heavy)
    Animal,
    /// Contacts with embedded components
    Contacts,
    /// Grab-bag of mapping edge cases
    Gambit,
    /// Helpdesk tickets and statuses
    Helpdesk,
    /// Retail orders and line items
    Retail,
    /// Monetary amounts and currencies
    Monetary,
    /// Books, authors and publishers
    Library,
}

impl StandardDomainModel {
    /// Stable name of the bundle
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Animal => "animal",
            Self::Contacts => "contacts",
            Self::Gambit => "gambit",
            Self::Helpdesk => "helpdesk",
            Self::Retail => "retail",
            Self::Monetary => "monetary",
            Self::Library => "library",
        }
    }

    /// Descriptor contributing this bundle
    #[inline]
    #[must_use]
    pub fn descriptor(self) -> StandardModelDescriptor {
        StandardModelDescriptor(self)
    }
}

impl fmt::Display for StandardDomainModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contributes a set of model sources to an aggregator
pub trait DomainModelDescriptor: Send + Sync {
    /// Apply this descriptor's contributions
    ///
    /// # Errors
    /// Propagates whatever the aggregator rejects
    fn apply_domain_model(&self, sources: &mut dyn ModelSources) -> SourcesResult<()>;
}

/// Descriptor for a [`StandardDomainModel`] bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardModelDescriptor(StandardDomainModel);

impl DomainModelDescriptor for StandardModelDescriptor {
    fn apply_domain_model(&self, sources: &mut dyn ModelSources) -> SourcesResult<()> {
        sources.add_standard_model(self.0)
    }
}

/// Model-source aggregator
///
/// Later contributions may override earlier ones; merge semantics belong to
/// the implementation.
pub trait ModelSources {
    /// Scan an annotated package
    ///
    /// # Errors
    /// Implementation-defined
    fn add_package(&mut self, package_name: &str) -> SourcesResult<()>;

    /// Add a bundled standard model
    ///
    /// # Errors
    /// Implementation-defined
    fn add_standard_model(&mut self, model: StandardDomainModel) -> SourcesResult<()>;

    /// Add an annotated class
    ///
    /// # Errors
    /// Implementation-defined
    fn add_annotated_class(&mut self, class: &ClassRef) -> SourcesResult<()>;

    /// Add an annotated class by name
    ///
    /// # Errors
    /// Implementation-defined
    fn add_annotated_class_name(&mut self, class_name: &str) -> SourcesResult<()>;

    /// Add a mapping resource (e.g. an XML mapping path)
    ///
    /// # Errors
    /// Implementation-defined
    fn add_resource(&mut self, resource: &str) -> SourcesResult<()>;

    /// Register a query import
    ///
    /// # Errors
    /// Implementation-defined
    fn add_query_import(&mut self, name: &str, class: &ClassRef) -> SourcesResult<()>;

    /// Build the model from everything contributed so far
    ///
    /// # Errors
    /// Implementation-defined
    fn build(self: Box<Self>) -> SourcesResult<DomainModel>;
}

/// Factory creating a descriptor instance
pub type DescriptorFactory =
    Arc<dyn Fn() -> Result<Box<dyn DomainModelDescriptor>, DescriptorError> + Send + Sync>;

/// Named descriptor factories
///
/// Declarative specs reference custom descriptors by name; this registry turns
/// a name into a fresh instance.
#[derive(Default, Clone)]
pub struct DescriptorRegistry {
    factories: HashMap<String, DescriptorFactory>,
}

impl DescriptorRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name` (replaces any previous one)
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn DomainModelDescriptor>, DescriptorError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a descriptor built with `Default`
    pub fn register_default<D>(&mut self, name: impl Into<String>)
    where
        D: DomainModelDescriptor + Default + 'static,
    {
        self.register(name, || Ok(Box::new(D::default()) as Box<dyn DomainModelDescriptor>));
    }

    /// Instantiate the descriptor registered as `name`
    ///
    /// # Errors
    /// - `DescriptorError::Unregistered` if no factory exists
    /// - whatever the factory returns
    pub fn instantiate(
        &self,
        name: &str,
    ) -> Result<Box<dyn DomainModelDescriptor>, DescriptorError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DescriptorError::Unregistered(name.to_string()))?;
        factory()
    }

    /// Check if a factory exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Number of registered factories
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourcesError;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl ModelSources for Recorder {
        fn add_package(&mut self, package_name: &str) -> SourcesResult<()> {
            self.calls.push(format!("package:{package_name}"));
            Ok(())
        }

        fn add_standard_model(&mut self, model: StandardDomainModel) -> SourcesResult<()> {
            self.calls.push(format!("standard:{model}"));
            Ok(())
        }

        fn add_annotated_class(&mut self, class: &ClassRef) -> SourcesResult<()> {
            self.calls.push(format!("class:{class}"));
            Ok(())
        }

        fn add_annotated_class_name(&mut self, class_name: &str) -> SourcesResult<()> {
            self.calls.push(format!("class-name:{class_name}"));
            Ok(())
        }

        fn add_resource(&mut self, resource: &str) -> SourcesResult<()> {
            self.calls.push(format!("resource:{resource}"));
            Ok(())
        }

        fn add_query_import(&mut self, name: &str, class: &ClassRef) -> SourcesResult<()> {
            self.calls.push(format!("import:{name}={class}"));
            Ok(())
        }

        fn build(self: Box<Self>) -> SourcesResult<DomainModel> {
            Err(SourcesError::Build("recorder does not build".to_string()))
        }
    }

    #[derive(Default)]
    struct OrdersDescriptor;

    impl DomainModelDescriptor for OrdersDescriptor {
        fn apply_domain_model(&self, sources: &mut dyn ModelSources) -> SourcesResult<()> {
            sources.add_annotated_class(&ClassRef::new("org.example.Order"))
        }
    }

    #[test]
    fn class_ref_simple_name() {
        assert_eq!(ClassRef::new("org.example.zoo.Animal").simple_name(), "Animal");
        assert_eq!(ClassRef::new("org.example.Outer$Inner").simple_name(), "Inner");
        assert_eq!(ClassRef::new("Bare").simple_name(), "Bare");
    }

    #[test]
    fn standard_model_descriptor_contributes_bundle() {
        let mut recorder = Recorder::default();
        StandardDomainModel::Retail
            .descriptor()
            .apply_domain_model(&mut recorder)
            .unwrap();
        assert_eq!(recorder.calls, vec!["standard:retail"]);
    }

    #[test]
    fn registry_instantiates_registered_descriptor() {
        let mut registry = DescriptorRegistry::new();
        registry.register_default::<OrdersDescriptor>("orders");

        let descriptor = registry.instantiate("orders").unwrap();
        let mut recorder = Recorder::default();
        descriptor.apply_domain_model(&mut recorder).unwrap();

        assert_eq!(recorder.calls, vec!["class:org.example.Order"]);
        assert!(registry.contains("orders"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_rejects_unknown_name() {
        let registry = DescriptorRegistry::new();
        let result = registry.instantiate("missing");
        assert!(matches!(result, Err(DescriptorError::Unregistered(name)) if name == "missing"));
    }

    #[test]
    fn registry_surfaces_factory_failure() {
        let mut registry = DescriptorRegistry::new();
        registry.register("broken", || {
            Err(DescriptorError::construction("no default constructor"))
        });

        let result = registry.instantiate("broken");
        assert!(matches!(result, Err(DescriptorError::Construction(_))));
    }
}
