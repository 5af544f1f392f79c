use crate::{
    patch::merge::merge_value,
    value::{F64, Value},
};
use proptest::{prelude::*, test_runner::TestCaseError};
use std::collections::BTreeSet;

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        any::<f64>().prop_map(|f| Value::Float(F64::new(f))),
        "[a-z]{0,8}".prop_map(Value::Text),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::btree_set(inner.clone(), 0..4).prop_map(Value::Set),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

proptest! {
    #[test]
    fn non_map_pairs_replace_wholesale(existing in arb_value(), incoming in arb_value()) {
        prop_assume!(
            !matches!(existing, Value::Map(_)) || !matches!(incoming, Value::Map(_))
        );

        prop_assert_eq!(merge_value(&existing, &incoming, None), incoming);
    }

    #[test]
    fn null_clears_any_existing_value(existing in arb_value()) {
        prop_assert_eq!(merge_value(&existing, &Value::Null, None), Value::Null);
    }

    #[test]
    fn map_merge_unions_keys(
        old in prop::collection::btree_map("[a-z]{1,3}", arb_scalar(), 0..6),
        new in prop::collection::btree_map("[a-z]{1,3}", arb_scalar(), 0..6),
    ) {
        let merged = merge_value(&Value::Map(old.clone()), &Value::Map(new.clone()), None);
        let Value::Map(entries) = merged else {
            return Err(TestCaseError::fail("map merge must yield a map"));
        };

        let expected: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
        prop_assert_eq!(entries.len(), expected.len());

        // Incoming scalars win; untouched keys survive.
        for (key, value) in &new {
            prop_assert_eq!(entries.get(key), Some(value));
        }
        for (key, value) in &old {
            if !new.contains_key(key) {
                prop_assert_eq!(entries.get(key), Some(value));
            }
        }
    }

    #[test]
    fn merging_the_same_patch_twice_is_stable(existing in arb_value(), incoming in arb_value()) {
        let once = merge_value(&existing, &incoming, None);
        let twice = merge_value(&once, &incoming, None);

        prop_assert_eq!(twice, once);
    }

    #[test]
    fn customizer_outcome_wins_at_every_pair(existing in arb_value(), incoming in arb_value()) {
        let pin = |_: &Value, _: &Value| Some(Value::Bool(true));

        prop_assert_eq!(
            merge_value(&existing, &incoming, Some(&pin)),
            Value::Bool(true)
        );
    }
}
