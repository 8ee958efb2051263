//! Cache-strategy post-processing
//!
//! Tags root entity bindings and collection bindings of a built model with a
//! cache concurrency strategy. Anything mapping a large object is left alone.

use crate::binding::{EntityBinding, Value};
use crate::model::DomainModel;

/// Type names identifying large-object mappings (exact, case-sensitive)
pub const LOB_TYPE_NAMES: [&str; 9] = [
    "blob",
    "clob",
    "nclob",
    "java.sql.Blob",
    "java.sql.Clob",
    "java.sql.NClob",
    "org.hibernate.type.BlobType",
    "org.hibernate.type.ClobType",
    "org.hibernate.type.NClobType",
];

/// Check whether `type_name` denotes a large object
#[inline]
#[must_use]
pub fn is_lob(type_name: &str) -> bool {
    LOB_TYPE_NAMES.contains(&type_name)
}

/// Outcome of one [`apply_cache_settings`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheApplyReport {
    /// Entities tagged with the strategy
    pub entities_cached: usize,
    /// Entities skipped because they inherit from another binding
    pub entities_skipped_inherited: usize,
    /// Entities skipped because a property maps a large object
    pub entities_skipped_lob: usize,
    /// Collections tagged with the strategy
    pub collections_cached: usize,
    /// Collections skipped because their element is a large object
    pub collections_skipped_lob: usize,
}

impl CacheApplyReport {
    /// Whether the pass touched nothing at all
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply `strategy` to every eligible binding of `model`
///
/// Does nothing when `enabled` is false or `strategy` is empty. Re-applying
/// the same strategy leaves the model unchanged.
pub fn apply_cache_settings(
    model: &mut DomainModel,
    enabled: bool,
    strategy: &str,
) -> CacheApplyReport {
    let mut report = CacheApplyReport::default();

    if !enabled || strategy.is_empty() {
        return report;
    }

    for entity in model.entity_bindings_mut() {
        if entity.is_inherited() {
            report.entities_skipped_inherited += 1;
            continue;
        }

        if has_lob_property(entity) {
            report.entities_skipped_lob += 1;
            continue;
        }

        entity.set_cache_concurrency_strategy(strategy);
        entity.set_cached(true);
        report.entities_cached += 1;
    }

    for collection in model.collection_bindings_mut() {
        if is_lob_value(collection.element()) {
            report.collections_skipped_lob += 1;
            continue;
        }

        collection.set_cache_concurrency_strategy(strategy);
        report.collections_cached += 1;
    }

    tracing::debug!(
        model = %model.id(),
        strategy,
        entities_cached = report.entities_cached,
        entities_skipped_inherited = report.entities_skipped_inherited,
        entities_skipped_lob = report.entities_skipped_lob,
        collections_cached = report.collections_cached,
        collections_skipped_lob = report.collections_skipped_lob,
        "applied cache settings"
    );

    report
}

fn has_lob_property(entity: &EntityBinding) -> bool {
    // any() stops at the first LOB
    entity.properties().any(|property| is_lob_value(property.value()))
}

fn is_lob_value(value: &Value) -> bool {
    value
        .as_simple()
        .is_some_and(|simple| is_lob(simple.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{CollectionBinding, EntityBinding};
    use pretty_assertions::assert_eq;

    fn sample_model() -> DomainModel {
        DomainModel::new()
            .with_entity(
                EntityBinding::root("Document")
                    .with_property("id", Value::simple("long"))
                    .with_property("payload", Value::simple("blob")),
            )
            .with_entity(
                EntityBinding::root("Customer")
                    .with_property("id", Value::simple("long"))
                    .with_property("name", Value::simple("string")),
            )
            .with_entity(EntityBinding::subclass("VipCustomer", "Customer"))
            .with_collection(CollectionBinding::new(
                "Customer.notes",
                Value::simple("org.hibernate.type.ClobType"),
            ))
            .with_collection(CollectionBinding::new("Customer.tags", Value::simple("string")))
    }

    fn snapshot(model: &DomainModel) -> (Vec<EntityBinding>, Vec<CollectionBinding>) {
        (
            model.entity_bindings().cloned().collect(),
            model.collection_bindings().cloned().collect(),
        )
    }

    #[test]
    fn lob_set_is_exact() {
        for name in LOB_TYPE_NAMES {
            assert!(is_lob(name), "{name} should be a LOB");
        }
        assert!(!is_lob("BLOB"));
        assert!(!is_lob("Clob"));
        assert!(!is_lob("java.sql.BlobX"));
        assert!(!is_lob("materialized_blob"));
        assert!(!is_lob(""));
    }

    #[test]
    fn disabled_is_noop() {
        let mut model = sample_model();
        let before = snapshot(&model);

        let report = apply_cache_settings(&mut model, false, "read-write");

        assert!(report.is_noop());
        assert_eq!(snapshot(&model), before);
    }

    #[test]
    fn empty_strategy_is_noop() {
        let mut model = sample_model();
        let before = snapshot(&model);

        let report = apply_cache_settings(&mut model, true, "");

        assert!(report.is_noop());
        assert_eq!(snapshot(&model), before);
    }

    #[test]
    fn lob_entity_is_skipped_sibling_is_cached() {
        let mut model = sample_model();
        apply_cache_settings(&mut model, true, "read-write");

        let document = model.entity_binding("Document").unwrap();
        assert!(!document.is_cached());
        assert_eq!(document.cache_concurrency_strategy(), None);

        let customer = model.entity_binding("Customer").unwrap();
        assert!(customer.is_cached());
        assert_eq!(customer.cache_concurrency_strategy(), Some("read-write"));
    }

    #[test]
    fn inherited_entity_is_skipped() {
        let mut model = sample_model();
        let report = apply_cache_settings(&mut model, true, "read-write");

        let vip = model.entity_binding("VipCustomer").unwrap();
        assert!(!vip.is_cached());
        assert_eq!(vip.cache_concurrency_strategy(), None);
        assert_eq!(report.entities_skipped_inherited, 1);
    }

    #[test]
    fn clob_wrapper_collection_is_skipped() {
        let mut model = sample_model();
        let report = apply_cache_settings(&mut model, true, "nonstrict-read-write");

        let notes = model.collection_binding("Customer.notes").unwrap();
        assert_eq!(notes.cache_concurrency_strategy(), None);

        let tags = model.collection_binding("Customer.tags").unwrap();
        assert_eq!(tags.cache_concurrency_strategy(), Some("nonstrict-read-write"));

        assert_eq!(
            report,
            CacheApplyReport {
                entities_cached: 1,
                entities_skipped_inherited: 1,
                entities_skipped_lob: 1,
                collections_cached: 1,
                collections_skipped_lob: 1,
            }
        );
    }

    #[test]
    fn opaque_values_are_ignored() {
        let mut model = DomainModel::new()
            .with_entity(EntityBinding::root("Order").with_property(
                "customer",
                Value::ManyToOne {
                    referenced_entity: "blob".to_string(),
                },
            ))
            .with_collection(CollectionBinding::new(
                "Order.lines",
                Value::Component {
                    class_name: "clob".to_string(),
                },
            ));

        apply_cache_settings(&mut model, true, "transactional");

        assert!(model.entity_binding("Order").unwrap().is_cached());
        assert_eq!(
            model
                .collection_binding("Order.lines")
                .unwrap()
                .cache_concurrency_strategy(),
            Some("transactional")
        );
    }

    #[test]
    fn reapplying_is_idempotent() {
        let mut model = sample_model();
        apply_cache_settings(&mut model, true, "read-only");
        let once = snapshot(&model);

        apply_cache_settings(&mut model, true, "read-only");
        assert_eq!(snapshot(&model), once);
    }
}
