//! Superset matching of JSON responses.
//!
//! A response matches an expected shape when it contains every asserted field
//! with an equal value. Extra fields are allowed at every depth. Expected
//! array elements must each match some element of the actual array, in any
//! order.

use serde_json::Value;

/// First point where a response failed to contain the expected shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("at {path}: expected {expected}, found {}", found_text(.actual))]
pub struct SubsetMismatch {
    /// JSON path of the mismatch, `$` being the root.
    pub path: String,
    /// Expected value at `path`.
    pub expected: Value,
    /// Actual value at `path`, `None` when the field is missing.
    pub actual: Option<Value>,
}

fn found_text(actual: &Option<Value>) -> String {
    actual
        .as_ref()
        .map_or_else(|| "nothing".to_string(), Value::to_string)
}

/// Checks that `actual` contains `expected`.
pub fn contains_subset(actual: &Value, expected: &Value) -> Result<(), SubsetMismatch> {
    check(actual, expected, "$")
}

/// Returns true if `actual` contains `expected`.
pub fn is_subset(actual: &Value, expected: &Value) -> bool {
    contains_subset(actual, expected).is_ok()
}

fn check(actual: &Value, expected: &Value, path: &str) -> Result<(), SubsetMismatch> {
    let mismatch = || SubsetMismatch {
        path: path.to_string(),
        expected: expected.clone(),
        actual: Some(actual.clone()),
    };

    match (expected, actual) {
        (Value::Object(expected_fields), Value::Object(actual_fields)) => {
            for (key, expected_value) in expected_fields {
                let child = format!("{path}.{key}");
                match actual_fields.get(key) {
                    Some(actual_value) => check(actual_value, expected_value, &child)?,
                    None => {
                        return Err(SubsetMismatch {
                            path: child,
                            expected: expected_value.clone(),
                            actual: None,
                        })
                    }
                }
            }
            Ok(())
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            for (index, expected_item) in expected_items.iter().enumerate() {
                if !actual_items.iter().any(|item| is_subset(item, expected_item)) {
                    return Err(SubsetMismatch {
                        path: format!("{path}[{index}]"),
                        expected: expected_item.clone(),
                        actual: Some(actual.clone()),
                    });
                }
            }
            Ok(())
        }
        (Value::Object(_) | Value::Array(_), _) => Err(mismatch()),
        _ if expected == actual => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn reference() -> Value {
        json!({
            "id": 100,
            "category": {"id": 0, "name": "Cat"},
            "name": "Pet",
            "photoUrls": ["url"],
            "tags": [{"id": 0, "name": "my_tag"}],
            "status": "available"
        })
    }

    #[test_case(json!({}) ; "empty shape")]
    #[test_case(json!({"id": 100}) ; "scalar field")]
    #[test_case(json!({"category": {"name": "Cat"}}) ; "partial nested object")]
    #[test_case(json!({"tags": [{"name": "my_tag"}]}) ; "partial array element")]
    #[test_case(json!({"photoUrls": []}) ; "empty expected array")]
    fn test_matches(expected: Value) {
        assert_eq!(contains_subset(&reference(), &expected), Ok(()));
    }

    #[test_case(json!({"name": "Dog"}), "$.name" ; "changed scalar")]
    #[test_case(json!({"owner": "me"}), "$.owner" ; "missing field")]
    #[test_case(json!({"category": {"id": 1}}), "$.category.id" ; "changed nested")]
    #[test_case(json!({"tags": [{"name": "other"}]}), "$.tags[0]" ; "unmatched element")]
    #[test_case(json!({"status": {"value": "available"}}), "$.status" ; "object against scalar")]
    fn test_mismatches(expected: Value, path: &str) {
        let mismatch = contains_subset(&reference(), &expected).unwrap_err();
        assert_eq!(mismatch.path, path);
    }

    #[test]
    fn test_extra_fields_allowed() {
        let mut actual = reference();
        actual["createdBy"] = json!("server");
        assert!(is_subset(&actual, &reference()));
    }

    #[test]
    fn test_array_order_is_ignored() {
        let actual = json!({"photoUrls": ["a", "b", "c"]});
        assert!(is_subset(&actual, &json!({"photoUrls": ["c", "a"]})));
    }

    #[test]
    fn test_mismatch_display_names_missing_field() {
        let mismatch = contains_subset(&json!({}), &json!({"id": 1})).unwrap_err();
        assert_eq!(mismatch.to_string(), "at $.id: expected 1, found nothing");
    }
}
