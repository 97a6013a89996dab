//! Property-based tests for the validation engine

use json_schema::exports::to_value;
use json_schema::{decode, Pool, Schema, Validator};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-1000.0f64..1000.0).prop_map(|n| json!(n)),
        "[a-z\u{e9}\u{1F600}]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]{1,2}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_type_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "null", "boolean", "object", "array", "number", "string", "integer",
    ])
}

fn arb_schema() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_type_name().prop_map(|t| json!({"type": t})),
        (0u64..4).prop_map(|n| json!({"minLength": n})),
        (0u64..4).prop_map(|n| json!({"maxItems": n})),
        (-5i64..5).prop_map(|n| json!({"minimum": n})),
        (1i64..4).prop_map(|n| json!({"multipleOf": n})),
        Just(json!({"uniqueItems": true})),
        Just(json!({"required": ["a"]})),
        Just(json!({"properties": {"a": {"type": "integer"}}})),
        Just(json!({"items": {"type": "string"}})),
        Just(json!(true)),
        Just(json!(false)),
    ]
}

fn check(schema: &Schema, value: &Value) -> Result<(), Vec<String>> {
    let pool = Pool::from_root(schema);
    Validator::new(&pool)
        .validate(value, schema)
        .map_err(|errors| errors.iter().map(|e| e.to_string()).collect())
}

proptest! {
    #[test]
    fn test_boolean_schemas(value in arb_json()) {
        prop_assert!(check(&decode(&json!(true)).unwrap(), &value).is_ok());
        prop_assert!(check(&decode(&json!(false)).unwrap(), &value).is_err());
    }

    #[test]
    fn test_validation_is_deterministic(schema in arb_schema(), value in arb_json()) {
        let schema = decode(&schema).unwrap();
        prop_assert_eq!(check(&schema, &value), check(&schema, &value));
    }

    #[test]
    fn test_one_of_exclusivity(a in arb_schema(), b in arb_schema(), value in arb_json()) {
        let combined = decode(&json!({"oneOf": [a.clone(), b.clone()]})).unwrap();
        let a = decode(&a).unwrap();
        let b = decode(&b).unwrap();

        let successes = [check(&a, &value).is_ok(), check(&b, &value).is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count();
        prop_assert_eq!(check(&combined, &value).is_ok(), successes == 1);
    }

    #[test]
    fn test_type_round_trip(types in prop::collection::vec(arb_type_name(), 1..4)) {
        let mut unique = types.clone();
        unique.sort_unstable();
        unique.dedup();

        let schema = decode(&json!({"type": unique})).unwrap();
        let again = decode(&to_value(&schema)).unwrap();
        prop_assert_eq!(
            &schema.as_object().unwrap().type_,
            &again.as_object().unwrap().type_
        );
    }
}
