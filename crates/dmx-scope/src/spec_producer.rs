//! Producer synthesized from a [`DomainModelSpec`]

use crate::error::{ScopeError, ScopeResult};
use crate::producer::DomainModelProducer;
use crate::registry::ServiceRegistry;
use crate::spec::DomainModelSpec;
use dmx_model::{
    apply_cache_settings, DescriptorRegistry, DomainModel, DomainModelDescriptor, ModelSources,
};
use std::fmt;
use std::sync::Arc;

/// Creates a fresh model-source aggregator for one build
pub trait SourcesFactory: Send + Sync {
    /// New aggregator bound to `registry`
    fn create_sources(&self, registry: &ServiceRegistry) -> Box<dyn ModelSources>;
}

impl<F> SourcesFactory for F
where
    F: Fn(&ServiceRegistry) -> Box<dyn ModelSources> + Send + Sync,
{
    fn create_sources(&self, registry: &ServiceRegistry) -> Box<dyn ModelSources> {
        self(registry)
    }
}

/// Builds a model from a declarative spec
///
/// Contributions are applied in a fixed order:
/// 1. annotated packages
/// 2. standard model bundles
/// 3. custom descriptors (one instance each)
/// 4. annotated classes
/// 5. annotated class names
/// 6. mapping resources
/// 7. named query imports
/// 8. simple-name query imports
///
/// The built model then gets the spec's cache override applied.
pub struct SpecDrivenProducer {
    spec: DomainModelSpec,
    descriptors: Arc<DescriptorRegistry>,
    sources: Arc<dyn SourcesFactory>,
}

impl SpecDrivenProducer {
    /// Create producer
    #[must_use]
    pub fn new(
        spec: DomainModelSpec,
        descriptors: Arc<DescriptorRegistry>,
        sources: Arc<dyn SourcesFactory>,
    ) -> Self {
        Self {
            spec,
            descriptors,
            sources,
        }
    }

    /// Spec this producer builds from
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &DomainModelSpec {
        &self.spec
    }

    fn contribute(&self, sources: &mut dyn ModelSources) -> ScopeResult<()> {
        let spec = &self.spec;

        for package_name in &spec.annotated_package_names {
            sources.add_package(package_name)?;
        }

        for standard_model in &spec.standard_models {
            standard_model.descriptor().apply_domain_model(sources)?;
        }

        for descriptor_name in &spec.model_descriptor_classes {
            let descriptor = self
                .descriptors
                .instantiate(descriptor_name)
                .map_err(|source| ScopeError::descriptor_instantiation(descriptor_name, source))?;
            descriptor.apply_domain_model(sources)?;
        }

        for class in &spec.annotated_classes {
            sources.add_annotated_class(class)?;
        }

        for class_name in &spec.annotated_class_names {
            sources.add_annotated_class_name(class_name)?;
        }

        for resource in &spec.xml_mappings {
            sources.add_resource(resource)?;
        }

        for import in &spec.extra_query_imports {
            sources.add_query_import(&import.name, &import.imported_class)?;
        }

        for class in &spec.extra_query_import_classes {
            sources.add_query_import(class.simple_name(), class)?;
        }

        Ok(())
    }
}

impl DomainModelProducer for SpecDrivenProducer {
    fn produce_model(&self, registry: &ServiceRegistry) -> ScopeResult<DomainModel> {
        let mut sources = self.sources.create_sources(registry);
        self.contribute(sources.as_mut())?;

        let mut model = sources.build()?;
        apply_cache_settings(
            &mut model,
            self.spec.override_cache_strategy,
            &self.spec.concurrency_strategy,
        );
        Ok(model)
    }
}

impl fmt::Debug for SpecDrivenProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecDrivenProducer")
            .field("spec", &self.spec)
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}
