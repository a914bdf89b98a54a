use crate::value::Value;

/// Replace every NaN-like scalar in a value tree with the explicit
/// `Absent` marker, so the API boundary never sees a not-a-number
/// sentinel.
///
/// Maps are recursed fully. Sequence elements are recursed only when they
/// are themselves maps; other elements pass through unchanged. Legitimate
/// zeros, empty strings, and stored NULLs are preserved as-is. The
/// transform is pure and idempotent.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Float(f) if f.is_nan() => Value::Absent,
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Map(_) => normalize(item),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_replaces_nan_in_nested_structure() {
        let input = map(vec![
            ("a", Value::Float(f64::NAN)),
            ("b", Value::Integer(0)),
            ("c", Value::Null),
            ("d", Value::List(vec![map(vec![("e", Value::Float(f64::NAN))])])),
        ]);

        let expected = map(vec![
            ("a", Value::Absent),
            ("b", Value::Integer(0)),
            ("c", Value::Null),
            ("d", Value::List(vec![map(vec![("e", Value::Absent)])])),
        ]);

        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_preserves_legitimate_values() {
        let input = map(vec![
            ("zero", Value::Integer(0)),
            ("zero_f", Value::Float(0.0)),
            ("empty", Value::Text(String::new())),
            ("null", Value::Null),
            ("flag", Value::Boolean(false)),
        ]);
        assert_eq!(normalize(input.clone()), input);
    }

    #[test]
    fn test_bare_scalar_nan_becomes_absent() {
        assert_eq!(normalize(Value::Float(f64::NAN)), Value::Absent);
        assert_eq!(normalize(Value::Float(1.5)), Value::Float(1.5));
    }

    #[test]
    fn test_sequence_elements_are_only_recursed_when_maps() {
        let input = Value::List(vec![
            Value::Float(f64::NAN),
            map(vec![("e", Value::Float(f64::NAN))]),
            Value::Integer(3),
        ]);
        let output = normalize(input);
        assert_eq!(
            output,
            Value::List(vec![
                Value::Float(f64::NAN),
                map(vec![("e", Value::Absent)]),
                Value::Integer(3),
            ])
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = vec![
            map(vec![
                ("a", Value::Float(f64::NAN)),
                ("d", Value::List(vec![map(vec![("e", Value::Float(f64::NAN))])])),
            ]),
            Value::List(vec![Value::Float(f64::NAN)]),
            Value::Float(f64::NAN),
            Value::Text("x".to_string()),
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(once.clone());
            assert_eq!(once, twice);
        }
    }
}
