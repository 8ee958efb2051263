//! Testing utilities for DMX workspace
//!
//! Shared test helpers, fixtures, and a recording model-source aggregator.

#![allow(missing_docs)]

use dmx_model::{
    ClassRef, CollectionBinding, DescriptorError, DescriptorRegistry, DomainModel,
    DomainModelDescriptor, EntityBinding, ModelSources, SourcesError, SourcesResult,
    StandardDomainModel, Value,
};
use dmx_scope::{
    DomainModelProducer, DomainModelScope, ScopeError, ScopeResult, ServiceRegistry,
    SourcesFactory, TestInstance,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Install a fmt subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One contribution seen by [`RecordingSources`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Package(String),
    StandardModel(StandardDomainModel),
    Class(String),
    ClassName(String),
    Resource(String),
    QueryImport { name: String, class: String },
}

/// Entities and collections a class contributes when added
#[derive(Debug, Clone, Default)]
pub struct ClassFixture {
    pub entities: Vec<EntityBinding>,
    pub collections: Vec<CollectionBinding>,
}

impl ClassFixture {
    pub fn entity(entity: EntityBinding) -> Self {
        Self {
            entities: vec![entity],
            collections: Vec::new(),
        }
    }

    pub fn with_collection(mut self, collection: CollectionBinding) -> Self {
        self.collections.push(collection);
        self
    }
}

/// Class name → fixture lookup used to resolve added classes
#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    classes: HashMap<String, ClassFixture>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class_name: impl Into<String>, fixture: ClassFixture) -> Self {
        self.classes.insert(class_name.into(), fixture);
        self
    }

    fn resolve(&self, class_name: &str) -> SourcesResult<&ClassFixture> {
        self.classes
            .get(class_name)
            .ok_or_else(|| SourcesError::UnknownClass(class_name.to_string()))
    }
}

/// Fixture bindings contributed by each standard bundle
pub fn standard_model_fixture(model: StandardDomainModel) -> ClassFixture {
    match model {
        StandardDomainModel::Animal => ClassFixture {
            entities: vec![
                EntityBinding::root("Animal")
                    .with_property("id", Value::simple("long"))
                    .with_property("description", Value::simple("string")),
                EntityBinding::subclass("Dog", "Animal"),
            ],
            collections: vec![CollectionBinding::new("Animal.offspring", Value::ManyToOne {
                referenced_entity: "Animal".to_string(),
            })],
        },
        StandardDomainModel::Contacts => ClassFixture {
            entities: vec![EntityBinding::root("Contact")
                .with_property("id", Value::simple("long"))
                .with_property("name", Value::Component {
                    class_name: "Name".to_string(),
                })
                .with_property("notes", Value::simple("clob"))],
            collections: vec![CollectionBinding::new("Contact.phones", Value::simple("string"))],
        },
        other => ClassFixture::entity(
            EntityBinding::root(format!("{}Root", other.name()))
                .with_property("id", Value::simple("long")),
        ),
    }
}

/// Aggregator that records every contribution and builds a model from fixtures
pub struct RecordingSources {
    catalog: Arc<ClassCatalog>,
    calls: Arc<Mutex<Vec<SourceCall>>>,
    model: DomainModel,
}

impl RecordingSources {
    pub fn new(catalog: Arc<ClassCatalog>, calls: Arc<Mutex<Vec<SourceCall>>>) -> Self {
        Self {
            catalog,
            calls,
            model: DomainModel::new(),
        }
    }

    fn merge(&mut self, fixture: &ClassFixture) {
        for entity in &fixture.entities {
            self.model.add_entity_binding(entity.clone());
        }
        for collection in &fixture.collections {
            self.model.add_collection_binding(collection.clone());
        }
    }

    fn add_class_named(&mut self, class_name: &str) -> SourcesResult<()> {
        let catalog = Arc::clone(&self.catalog);
        let fixture = catalog.resolve(class_name)?;
        self.merge(fixture);
        Ok(())
    }
}

impl ModelSources for RecordingSources {
    fn add_package(&mut self, package_name: &str) -> SourcesResult<()> {
        self.calls.lock().push(SourceCall::Package(package_name.to_string()));
        Ok(())
    }

    fn add_standard_model(&mut self, model: StandardDomainModel) -> SourcesResult<()> {
        self.calls.lock().push(SourceCall::StandardModel(model));
        self.merge(&standard_model_fixture(model));
        Ok(())
    }

    fn add_annotated_class(&mut self, class: &ClassRef) -> SourcesResult<()> {
        self.calls.lock().push(SourceCall::Class(class.name().to_string()));
        self.add_class_named(class.name())
    }

    fn add_annotated_class_name(&mut self, class_name: &str) -> SourcesResult<()> {
        self.calls.lock().push(SourceCall::ClassName(class_name.to_string()));
        self.add_class_named(class_name)
    }

    fn add_resource(&mut self, resource: &str) -> SourcesResult<()> {
        self.calls.lock().push(SourceCall::Resource(resource.to_string()));
        Ok(())
    }

    fn add_query_import(&mut self, name: &str, class: &ClassRef) -> SourcesResult<()> {
        self.calls.lock().push(SourceCall::QueryImport {
            name: name.to_string(),
            class: class.name().to_string(),
        });
        if let Some(existing) = self.model.imports().get(name) {
            if existing != class.name() {
                return Err(SourcesError::duplicate_import(name, existing.clone()));
            }
        }
        self.model.add_import(name, class.name());
        Ok(())
    }

    fn build(self: Box<Self>) -> SourcesResult<DomainModel> {
        Ok(self.model)
    }
}

/// [`SourcesFactory`] handing out [`RecordingSources`] that share one call log
#[derive(Debug, Default)]
pub struct RecordingSourcesFactory {
    catalog: Arc<ClassCatalog>,
    calls: Arc<Mutex<Vec<SourceCall>>>,
    created: AtomicUsize,
}

impl RecordingSourcesFactory {
    pub fn new(catalog: ClassCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            calls: Arc::default(),
            created: AtomicUsize::new(0),
        }
    }

    /// Contributions recorded so far, across all builds
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().clone()
    }

    /// Number of aggregators handed out
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl SourcesFactory for RecordingSourcesFactory {
    fn create_sources(&self, _registry: &ServiceRegistry) -> Box<dyn ModelSources> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingSources::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.calls),
        ))
    }
}

/// Descriptor adding a fixed list of classes
#[derive(Debug, Clone, Default)]
pub struct ClassListDescriptor {
    pub classes: Vec<ClassRef>,
}

impl DomainModelDescriptor for ClassListDescriptor {
    fn apply_domain_model(&self, sources: &mut dyn ModelSources) -> SourcesResult<()> {
        for class in &self.classes {
            sources.add_annotated_class(class)?;
        }
        Ok(())
    }
}

/// Register a descriptor whose construction always fails
pub fn register_failing_descriptor(registry: &mut DescriptorRegistry, name: &str) {
    let message = format!("{name} has no accessible default constructor");
    registry.register(name, move || Err(DescriptorError::construction(message.clone())));
}

/// Register a descriptor contributing `classes`
pub fn register_class_list_descriptor(
    registry: &mut DescriptorRegistry,
    name: &str,
    classes: &[&str],
) {
    let classes: Vec<ClassRef> = classes.iter().copied().map(ClassRef::from).collect();
    registry.register(name, move || {
        Ok(Box::new(ClassListDescriptor {
            classes: classes.clone(),
        }) as Box<dyn DomainModelDescriptor>)
    });
}

/// Producer counting its invocations
pub fn counting_producer(calls: Arc<AtomicUsize>) -> Arc<dyn DomainModelProducer> {
    Arc::new(move |_: &ServiceRegistry| -> ScopeResult<DomainModel> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(DomainModel::new().with_entity(EntityBinding::root("Fixture")))
    })
}

/// Producer that always fails
pub fn failing_producer(message: &str) -> Arc<dyn DomainModelProducer> {
    let message = message.to_string();
    Arc::new(move |_: &ServiceRegistry| -> ScopeResult<DomainModel> {
        Err(ScopeError::producer(message.clone()))
    })
}

/// Test instance that relies on the declarative spec and records injection
#[derive(Debug, Default)]
pub struct SpecDrivenTest {
    injected: Mutex<Option<Arc<DomainModelScope>>>,
}

impl SpecDrivenTest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn injected_scope(&self) -> Option<Arc<DomainModelScope>> {
        self.injected.lock().clone()
    }
}

impl TestInstance for SpecDrivenTest {
    fn inject_model_scope(&self, scope: Arc<DomainModelScope>) {
        *self.injected.lock() = Some(scope);
    }
}

/// Test instance supplying its own producer
pub struct SelfProducingTest {
    producer: Arc<dyn DomainModelProducer>,
}

impl SelfProducingTest {
    pub fn new(producer: Arc<dyn DomainModelProducer>) -> Self {
        Self { producer }
    }
}

impl TestInstance for SelfProducingTest {
    fn model_producer(&self) -> Option<Arc<dyn DomainModelProducer>> {
        Some(Arc::clone(&self.producer))
    }
}
