//! Built domain model artifact

use crate::binding::{CollectionBinding, EntityBinding};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identity of one built model
///
/// Every build yields a fresh id, so a rebuilt model is always
/// distinguishable from the one it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub Uuid);

impl ModelId {
    /// Generate new model ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Domain model graph produced from model sources
///
/// # Invariants
/// - Entity bindings are unique by entity name, collection bindings by role
/// - Iteration follows insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainModel {
    id: ModelId,
    entity_bindings: IndexMap<String, EntityBinding>,
    collection_bindings: IndexMap<String, CollectionBinding>,
    imports: IndexMap<String, String>,
}

impl DomainModel {
    /// Create empty model
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ModelId::new(),
            entity_bindings: IndexMap::new(),
            collection_bindings: IndexMap::new(),
            imports: IndexMap::new(),
        }
    }

    /// With entity binding (replaces a binding of the same name)
    #[inline]
    #[must_use]
    pub fn with_entity(mut self, entity: EntityBinding) -> Self {
        self.add_entity_binding(entity);
        self
    }

    /// With collection binding (replaces a binding of the same role)
    #[inline]
    #[must_use]
    pub fn with_collection(mut self, collection: CollectionBinding) -> Self {
        self.add_collection_binding(collection);
        self
    }

    /// Add or replace an entity binding
    pub fn add_entity_binding(&mut self, entity: EntityBinding) {
        self.entity_bindings
            .insert(entity.entity_name().to_string(), entity);
    }

    /// Add or replace a collection binding
    pub fn add_collection_binding(&mut self, collection: CollectionBinding) {
        self.collection_bindings
            .insert(collection.role().to_string(), collection);
    }

    /// Register a query import (`name` usable in queries for `entity_name`)
    pub fn add_import(&mut self, name: impl Into<String>, entity_name: impl Into<String>) {
        self.imports.insert(name.into(), entity_name.into());
    }

    /// Model identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Entity bindings in insertion order
    #[inline]
    pub fn entity_bindings(&self) -> impl Iterator<Item = &EntityBinding> {
        self.entity_bindings.values()
    }

    /// Mutable entity bindings
    #[inline]
    pub fn entity_bindings_mut(&mut self) -> impl Iterator<Item = &mut EntityBinding> {
        self.entity_bindings.values_mut()
    }

    /// Collection bindings in insertion order
    #[inline]
    pub fn collection_bindings(&self) -> impl Iterator<Item = &CollectionBinding> {
        self.collection_bindings.values()
    }

    /// Mutable collection bindings
    #[inline]
    pub fn collection_bindings_mut(&mut self) -> impl Iterator<Item = &mut CollectionBinding> {
        self.collection_bindings.values_mut()
    }

    /// Look up an entity binding by name
    #[inline]
    #[must_use]
    pub fn entity_binding(&self, entity_name: &str) -> Option<&EntityBinding> {
        self.entity_bindings.get(entity_name)
    }

    /// Look up a collection binding by role
    #[inline]
    #[must_use]
    pub fn collection_binding(&self, role: &str) -> Option<&CollectionBinding> {
        self.collection_bindings.get(role)
    }

    /// Query imports (import name → entity name)
    #[inline]
    #[must_use]
    pub fn imports(&self) -> &IndexMap<String, String> {
        &self.imports
    }

    /// Number of entity bindings
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_bindings.len()
    }

    /// Number of collection bindings
    #[inline]
    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.collection_bindings.len()
    }
}

impl Default for DomainModel {
    fn default() -> Self {
        Self::new()
    }
}
