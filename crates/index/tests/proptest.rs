//! Property-based tests for cinder-index using proptest.

use cinder_core::{Decimal, EntryKey, IndexKey, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use cinder_index::{
    AttributeDef, AttributeIndex, AttributeKey, AttributeValues, Comparison, HashStore, IndexConfig,
    IndexStore, KeySet, OrderedStore, StoreKind, TypeDefinition, TAG_ATTRIBUTE,
};
use proptest::prelude::*;

const COMPARISONS: [Comparison; 6] = [
    Comparison::Equals,
    Comparison::NotEquals,
    Comparison::LessThan,
    Comparison::GreaterThan,
    Comparison::LessThanEquals,
    Comparison::GreaterThanEquals,
];

fn index_key(value: Option<i64>) -> IndexKey {
    IndexKey::from(value.map(Value::Int64))
}

fn entry(i: usize) -> EntryKey {
    EntryKey::from(format!("k{}", i))
}

fn populate(store: &mut dyn IndexStore, values: &[Option<i64>]) {
    for (i, value) in values.iter().enumerate() {
        store.add(index_key(*value), entry(i));
    }
}

fn stores() -> Vec<Box<dyn IndexStore>> {
    vec![Box::new(HashStore::new()), Box::new(OrderedStore::new())]
}

fn values_strategy() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.9, -50i64..50), 1..200)
}

/// Integers, floats and decimals clustered where `f64` loses integer
/// precision, plus quarter steps every variant can express.
fn numeric_strategy() -> impl Strategy<Value = Value> {
    let base = 1i64 << 53;
    prop_oneof![
        (-3i64..4).prop_map(move |d| Value::Int64(base + d)),
        (-3i64..4).prop_map(move |d| Value::Float64((base + d) as f64)),
        (-3i64..4).prop_map(move |d| Value::Decimal(Decimal::from(base + d))),
        (-10i32..10).prop_map(Value::Int32),
        (-40i32..40).prop_map(|q| Value::Float64(f64::from(q) / 4.0)),
        (-40i64..40).prop_map(|q| Value::Decimal(Decimal::new(q * 25, 2))),
    ]
}

fn hash_of(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    /// Equals and NotEquals partition the store for any target value.
    #[test]
    fn equals_and_not_equals_cover(values in values_strategy(), target in prop::option::of(-60i64..60)) {
        for mut store in stores() {
            populate(store.as_mut(), &values);
            let target = index_key(target);
            let eq = store.get_data(&target, Comparison::Equals);
            let ne = store.get_data(&target, Comparison::NotEquals);
            prop_assert!(eq.is_disjoint(&ne));
            let union: KeySet = eq.union(&ne).cloned().collect();
            prop_assert_eq!(union, store.all_keys());
        }
    }

    /// GreaterThan, the target's bucket and LessThan partition the store.
    #[test]
    fn range_partition(values in values_strategy(), target in -60i64..60) {
        for mut store in stores() {
            populate(store.as_mut(), &values);
            let target = index_key(Some(target));
            let gt = store.get_data(&target, Comparison::GreaterThan);
            let eq = store.get_data(&target, Comparison::Equals);
            let lt = store.get_data(&target, Comparison::LessThan);
            prop_assert!(gt.is_disjoint(&eq));
            prop_assert!(gt.is_disjoint(&lt));
            prop_assert!(eq.is_disjoint(&lt));
            prop_assert_eq!(gt.len() + eq.len() + lt.len(), store.len());
        }
    }

    /// Both store strategies answer every comparison identically.
    #[test]
    fn hash_and_ordered_agree(values in values_strategy(), target in prop::option::of(-60i64..60)) {
        let mut hash = HashStore::new();
        let mut ordered = OrderedStore::new();
        populate(&mut hash, &values);
        populate(&mut ordered, &values);
        let target = index_key(target);
        for comparison in COMPARISONS {
            prop_assert_eq!(
                hash.get_data(&target, comparison),
                ordered.get_data(&target, comparison),
                "comparison {}", comparison
            );
        }
    }

    /// Removing every inserted pair empties the store.
    #[test]
    fn insert_remove_restores_store(values in values_strategy()) {
        for mut store in stores() {
            populate(store.as_mut(), &values);
            prop_assert_eq!(store.len(), values.len());
            for (i, value) in values.iter().enumerate() {
                prop_assert!(store.remove(&index_key(*value), &entry(i)));
            }
            prop_assert_eq!(store.len(), 0);
            prop_assert_eq!(store.distinct_values(), 0);
            prop_assert!(store.all_keys().is_empty());
        }
    }

    /// Adding then removing the same attribute maps leaves the attribute
    /// index as it was: plain stores empty, tag stores gone.
    #[test]
    fn attribute_index_add_remove_round_trip(
        rows in prop::collection::vec(
            (prop::option::of(0i32..20), prop::sample::select(vec!["red", "green", "blue"])),
            1..60,
        )
    ) {
        let index = AttributeIndex::new(
            TypeDefinition::schema_only("Item", vec![AttributeDef::new("size", StoreKind::Ordered)]),
            IndexConfig::default(),
        );
        let maps: Vec<AttributeValues> = rows
            .iter()
            .map(|(size, tag)| {
                let mut map = AttributeValues::new();
                map.insert("size".to_string(), size.map(Value::Int32));
                map.insert(TAG_ATTRIBUTE.to_string(), Some(Value::from(*tag)));
                map
            })
            .collect();

        for (i, map) in maps.iter().enumerate() {
            index.add_to_index(&entry(i), map).unwrap();
        }
        prop_assert_eq!(index.store_len(&AttributeKey::plain("size")), Some(rows.len()));
        prop_assert_eq!(index.all_keys().len(), rows.len());

        for (i, map) in maps.iter().enumerate() {
            index.remove_from_index(&entry(i), map).unwrap();
        }
        prop_assert_eq!(index.store_len(&AttributeKey::plain("size")), Some(0));
        prop_assert!(!index.has_store(&AttributeKey::Tag));
        prop_assert!(index.all_keys().is_empty());
    }

    /// Mixed numeric variants keep `Eq`, `Hash` and `Ord` consistent.
    #[test]
    fn mixed_numerics_are_consistent(values in prop::collection::vec(numeric_strategy(), 1..24)) {
        for a in &values {
            for b in &values {
                if a == b {
                    prop_assert_eq!(hash_of(a), hash_of(b), "{} == {}", a, b);
                }
                prop_assert_eq!(a.cmp(b), b.cmp(a).reverse());
                for c in &values {
                    if a <= b && b <= c {
                        prop_assert!(a <= c, "{} <= {} <= {}", a, b, c);
                    }
                }
            }
        }
    }

    /// Hash and ordered stores agree on mixed numeric keys.
    #[test]
    fn mixed_numeric_stores_agree(
        values in prop::collection::vec(numeric_strategy(), 1..40),
        target in numeric_strategy(),
    ) {
        let mut hash = HashStore::new();
        let mut ordered = OrderedStore::new();
        for (i, value) in values.iter().enumerate() {
            hash.add(IndexKey::from(Some(value.clone())), entry(i));
            ordered.add(IndexKey::from(Some(value.clone())), entry(i));
        }
        let target = IndexKey::from(Some(target));
        for comparison in COMPARISONS {
            prop_assert_eq!(
                hash.get_data(&target, comparison),
                ordered.get_data(&target, comparison),
                "comparison {}", comparison
            );
        }
    }
}
