//! Caller-supplied upload metadata and its conversion to tags.

use serde_json::Value;

use crate::bundlr::Tag;

/// Ordered key/value metadata attached to an upload.
///
/// Values are loosely typed. When converted to tags, falsy values (`null`,
/// `false`, `0`, `""`) are dropped and everything else is coerced to a
/// string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadMetadata {
    entries: Vec<(String, Value)>,
}

impl UploadMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite `key`. An overwritten key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One tag per truthy entry, in insertion order.
    pub fn to_tags(&self) -> Vec<Tag> {
        self.entries
            .iter()
            .filter(|(_, v)| is_truthy(v))
            .map(|(k, v)| Tag::new(k.clone(), coerce_to_string(v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UploadMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

/// JavaScript truthiness over JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a metadata value, as JavaScript's `String(value)` gives it.
///
/// Arrays join their elements with `,` (null elements become empty) and
/// objects become `[object Object]`. Integers keep every digit.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_js_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn format_js_number(f: f64) -> String {
    if f == 0.0 {
        "0".to_string()
    } else if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_entries_are_dropped() {
        let metadata = UploadMetadata::new()
            .with("hash", "ab12")
            .with("course", "")
            .with("holder", Value::Null)
            .with("draft", false)
            .with("copies", 0)
            .with("version", "1.0.0");
        let tags = metadata.to_tags();
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["hash", "version"]);
    }

    #[test]
    fn test_truthy_entries_are_coerced_once() {
        let metadata = UploadMetadata::new()
            .with("pages", 3)
            .with("signed", true)
            .with("ratio", 0.5)
            .with("labels", json!(["a", "b"]));
        let tags = metadata.to_tags();
        assert_eq!(
            tags,
            vec![
                Tag::new("pages", "3"),
                Tag::new("signed", "true"),
                Tag::new("ratio", "0.5"),
                Tag::new("labels", "a,b"),
            ]
        );
    }

    #[test]
    fn test_structured_values_coerce_like_js_strings() {
        assert_eq!(coerce_to_string(&json!(1.0)), "1");
        assert_eq!(coerce_to_string(&json!(-2.5)), "-2.5");
        assert_eq!(coerce_to_string(&json!(u64::MAX)), "18446744073709551615");
        assert_eq!(coerce_to_string(&json!([1, null, "x", [2, 3]])), "1,,x,2,3");
        assert_eq!(coerce_to_string(&json!({ "k": "v" })), "[object Object]");
        assert_eq!(coerce_to_string(&json!(null)), "null");

        let tags = UploadMetadata::new()
            .with("extra", json!({ "k": "v" }))
            .with("score", json!(4.0))
            .to_tags();
        assert_eq!(
            tags,
            vec![Tag::new("extra", "[object Object]"), Tag::new("score", "4")]
        );
    }

    #[test]
    fn test_last_write_wins_in_first_position() {
        let mut metadata = UploadMetadata::new();
        metadata.insert("issuer", "A");
        metadata.insert("date", "2024-01-01");
        metadata.insert("issuer", "B");
        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata.to_tags(),
            vec![Tag::new("issuer", "B"), Tag::new("date", "2024-01-01")]
        );
    }

    #[test]
    fn test_overwriting_with_falsy_removes_tag() {
        let metadata: UploadMetadata = [("hash", json!("x")), ("hash", json!(""))]
            .into_iter()
            .collect();
        assert!(metadata.to_tags().is_empty());
        assert_eq!(metadata.get("hash"), Some(&json!("")));
    }

    #[test]
    fn test_every_truthy_value_appears_exactly_once() {
        let values = [
            json!(null),
            json!(false),
            json!(true),
            json!(0),
            json!(-1),
            json!(""),
            json!("x"),
            json!({}),
        ];
        let metadata: UploadMetadata = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("k{}", i), v.clone()))
            .collect();
        let tags = metadata.to_tags();
        for (i, v) in values.iter().enumerate() {
            let key = format!("k{}", i);
            let count = tags.iter().filter(|t| t.name == key).count();
            assert_eq!(count, usize::from(is_truthy(v)), "value {}", v);
        }
    }
}
