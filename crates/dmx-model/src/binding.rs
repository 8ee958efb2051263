//! Entity, property and collection bindings
//!
//! Nodes of the [`DomainModel`](crate::DomainModel) graph. Only the parts the
//! cache-strategy post-processing needs are modelled in detail; everything
//! else about a mapping stays opaque.

use serde::{Deserialize, Serialize};

/// Value mapped by a property or held as a collection element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    /// Basic value with a resolvable type name
    Simple(SimpleValue),
    /// Embedded component (opaque)
    Component {
        /// Component class name
        class_name: String,
    },
    /// Association to another entity (opaque)
    ManyToOne {
        /// Referenced entity name
        referenced_entity: String,
    },
}

impl Value {
    /// Shorthand for a simple value of the given type name
    #[inline]
    #[must_use]
    pub fn simple(type_name: impl Into<String>) -> Self {
        Self::Simple(SimpleValue::new(type_name))
    }

    /// Whether this is a simple value
    #[inline]
    #[must_use]
    pub fn is_simple_value(&self) -> bool {
        matches!(self, Self::Simple(_))
    }

    /// Simple value, if this is one
    #[inline]
    #[must_use]
    pub fn as_simple(&self) -> Option<&SimpleValue> {
        match self {
            Self::Simple(simple) => Some(simple),
            _ => None,
        }
    }
}

/// Basic value carrying a type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleValue {
    type_name: String,
}

impl SimpleValue {
    /// Create simple value
    #[inline]
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Registered type name (e.g. `string`, `blob`, `java.sql.Clob`)
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Named property of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBinding {
    name: String,
    value: Value,
}

impl PropertyBinding {
    /// Create property binding
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Property name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Mapped entity type
///
/// An entity with a superclass is *inherited*; cache settings are only ever
/// applied to root entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBinding {
    entity_name: String,
    superclass: Option<String>,
    properties: Vec<PropertyBinding>,
    cached: bool,
    cache_concurrency_strategy: Option<String>,
}

impl EntityBinding {
    /// Create root entity binding
    #[must_use]
    pub fn root(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            superclass: None,
            properties: Vec::new(),
            cached: false,
            cache_concurrency_strategy: None,
        }
    }

    /// Create entity binding inheriting from `superclass`
    #[must_use]
    pub fn subclass(entity_name: impl Into<String>, superclass: impl Into<String>) -> Self {
        Self {
            superclass: Some(superclass.into()),
            ..Self::root(entity_name)
        }
    }

    /// Append a property
    #[inline]
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.push(PropertyBinding::new(name, value));
        self
    }

    /// Entity name
    #[inline]
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Superclass entity name, if inherited
    #[inline]
    #[must_use]
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Whether this binding inherits from another binding
    #[inline]
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.superclass.is_some()
    }

    /// Properties in declaration order
    #[inline]
    pub fn properties(&self) -> impl Iterator<Item = &PropertyBinding> {
        self.properties.iter()
    }

    /// Whether second-level caching is enabled
    #[inline]
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Enable or disable caching
    #[inline]
    pub fn set_cached(&mut self, cached: bool) {
        self.cached = cached;
    }

    /// Cache concurrency strategy, if set
    #[inline]
    #[must_use]
    pub fn cache_concurrency_strategy(&self) -> Option<&str> {
        self.cache_concurrency_strategy.as_deref()
    }

    /// Set cache concurrency strategy
    #[inline]
    pub fn set_cache_concurrency_strategy(&mut self, strategy: impl Into<String>) {
        self.cache_concurrency_strategy = Some(strategy.into());
    }
}

/// Mapped collection (keyed by role, e.g. `Order.lines`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionBinding {
    role: String,
    element: Value,
    cache_concurrency_strategy: Option<String>,
}

impl CollectionBinding {
    /// Create collection binding
    #[inline]
    #[must_use]
    pub fn new(role: impl Into<String>, element: Value) -> Self {
        Self {
            role: role.into(),
            element,
            cache_concurrency_strategy: None,
        }
    }

    /// Collection role
    #[inline]
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Element value
    #[inline]
    #[must_use]
    pub fn element(&self) -> &Value {
        &self.element
    }

    /// Cache concurrency strategy, if set
    #[inline]
    #[must_use]
    pub fn cache_concurrency_strategy(&self) -> Option<&str> {
        self.cache_concurrency_strategy.as_deref()
    }

    /// Set cache concurrency strategy
    #[inline]
    pub fn set_cache_concurrency_strategy(&mut self, strategy: impl Into<String>) {
        self.cache_concurrency_strategy = Some(strategy.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_binding_is_not_inherited() {
        let entity = EntityBinding::root("Customer");
        assert!(!entity.is_inherited());
        assert!(!entity.is_cached());
        assert_eq!(entity.cache_concurrency_strategy(), None);
    }

    #[test]
    fn subclass_binding_is_inherited() {
        let entity = EntityBinding::subclass("Dog", "Animal");
        assert!(entity.is_inherited());
        assert_eq!(entity.superclass(), Some("Animal"));
    }

    #[test]
    fn properties_keep_declaration_order() {
        let entity = EntityBinding::root("Person")
            .with_property("id", Value::simple("long"))
            .with_property("name", Value::simple("string"))
            .with_property("address", Value::Component {
                class_name: "Address".to_string(),
            });

        let names: Vec<_> = entity.properties().map(PropertyBinding::name).collect();
        assert_eq!(names, vec!["id", "name", "address"]);
    }

    #[test]
    fn value_simple_accessors() {
        let value = Value::simple("clob");
        assert!(value.is_simple_value());
        assert_eq!(value.as_simple().map(SimpleValue::type_name), Some("clob"));

        let opaque = Value::ManyToOne {
            referenced_entity: "Customer".to_string(),
        };
        assert!(!opaque.is_simple_value());
        assert!(opaque.as_simple().is_none());
    }

    #[test]
    fn collection_strategy_mutation() {
        let mut collection = CollectionBinding::new("Order.lines", Value::simple("string"));
        collection.set_cache_concurrency_strategy("read-only");
        assert_eq!(collection.cache_concurrency_strategy(), Some("read-only"));
    }
}
