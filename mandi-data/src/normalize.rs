use serde::de::DeserializeOwned;
use serde_json::Value;

/// Unwrap a paginated `{"results": [...]}` body. Any other value is returned unchanged.
pub fn unwrap_results(body: Value) -> Value {
    match body {
        Value::Object(mut object) if object.contains_key("results") => object
            .remove("results")
            .unwrap_or(Value::Array(Vec::new())),
        other => other,
    }
}

/// Decode a list response that may or may not be paginated.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, serde_json::Error> {
    let value = serde_json::from_str::<Value>(body)?;
    serde_json::from_value(unwrap_results(value))
}

/// Extract a displayable message from an error body's `detail` or `error` string field.
pub fn error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    ["detail", "error"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vegetable;

    #[test]
    fn test_decode_list_shapes() {
        struct TestCase {
            input: &'static str,
            expected: Option<Vec<&'static str>>,
        }

        let tests = vec![
            TestCase {
                // TC0: bare sequence
                input: r#"[{"name": "Tomato"}, {"name": "Onion"}]"#,
                expected: Some(vec!["Tomato", "Onion"]),
            },
            TestCase {
                // TC1: paginated envelope
                input: r#"{"count": 1, "next": null, "results": [{"name": "Okra"}]}"#,
                expected: Some(vec!["Okra"]),
            },
            TestCase {
                // TC2: empty paginated envelope
                input: r#"{"count": 0, "results": []}"#,
                expected: Some(vec![]),
            },
            TestCase {
                // TC3: object without results is not a sequence
                input: r#"{"total_savings": 12.0}"#,
                expected: None,
            },
            TestCase {
                // TC4: invalid JSON
                input: "<html>Bad Gateway</html>",
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = decode_list::<Vegetable>(test.input)
                .ok()
                .map(|list| list.into_iter().map(|v| v.name).collect::<Vec<_>>());
            let expected = test
                .expected
                .map(|names| names.into_iter().map(str::to_string).collect::<Vec<_>>());
            assert_eq!(actual, expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_error_message() {
        struct TestCase {
            input: &'static str,
            expected: Option<&'static str>,
        }

        let tests = vec![
            TestCase {
                // TC0: DRF style detail
                input: r#"{"detail": "Not found."}"#,
                expected: Some("Not found."),
            },
            TestCase {
                // TC1: custom error field
                input: r#"{"error": "City not found"}"#,
                expected: Some("City not found"),
            },
            TestCase {
                // TC2: detail wins over error
                input: r#"{"detail": "first", "error": "second"}"#,
                expected: Some("first"),
            },
            TestCase {
                // TC3: non-string detail is ignored
                input: r#"{"detail": {"price_per_kg": ["required"]}}"#,
                expected: None,
            },
            TestCase {
                // TC4: non-JSON body
                input: "Internal Server Error",
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = error_message(test.input);
            assert_eq!(actual.as_deref(), test.expected, "TC{} failed", index);
        }
    }
}
