//! Substitution context.
//!
//! A flat, immutable mapping from token keys to replacement values. Built
//! either directly by the caller or by the context resolver from
//! configuration sources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat key/value mapping used for token replacement.
///
/// Keys are kept ordered so listings and JSON output are stable.
///
/// # Examples
///
/// ```
/// use token_filter::core::Context;
///
/// let ctx: Context = [("city", "Topeka")].into_iter().collect();
/// assert_eq!(ctx.get("city"), Some("Topeka"));
/// assert_eq!(ctx.get("state"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    entries: BTreeMap<String, String>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builds a context from a JSON object.
    ///
    /// String values are taken verbatim; any other value is stored as its
    /// compact JSON text (`42`, `true`, `null`, `[1,2]`).
    #[must_use]
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .into_iter()
            .map(|(key, value)| (key, value_to_string(value)))
            .collect()
    }

    /// Looks up the replacement for a token key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Overlays `other` onto this context; keys in `other` win.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Renders a JSON value as substitution text.
pub(crate) fn value_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_new_is_empty() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.len(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut ctx = Context::new();
        assert_eq!(ctx.insert("foo", "bar"), None);
        assert_eq!(ctx.insert("foo", "baz"), Some("bar".to_string()));
        assert_eq!(ctx.get("foo"), Some("baz"));
        assert!(ctx.get("bar").is_none());
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base: Context = [("k", "a"), ("only_a", "1")].into_iter().collect();
        let overlay: Context = [("k", "b"), ("only_b", "2")].into_iter().collect();
        base.merge(overlay);
        assert_eq!(base.get("k"), Some("b"));
        assert_eq!(base.get("only_a"), Some("1"));
        assert_eq!(base.get("only_b"), Some("2"));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_from_json_object_stringifies_values() {
        let value = json!({
            "name": "Topeka",
            "count": 42,
            "ratio": 1.5,
            "enabled": true,
            "nothing": null,
            "list": [1, 2],
        });
        let serde_json::Value::Object(map) = value else {
            unreachable!()
        };
        let ctx = Context::from_json_object(map);
        assert_eq!(ctx.get("name"), Some("Topeka"));
        assert_eq!(ctx.get("count"), Some("42"));
        assert_eq!(ctx.get("ratio"), Some("1.5"));
        assert_eq!(ctx.get("enabled"), Some("true"));
        assert_eq!(ctx.get("nothing"), Some("null"));
        assert_eq!(ctx.get("list"), Some("[1,2]"));
    }

    #[test]
    fn test_iter_is_key_ordered() {
        let ctx: Context = [("b", "2"), ("a", "1")].into_iter().collect();
        let keys: Vec<_> = ctx.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_serde_transparent() {
        let ctx: Context = [("foo", "bar")].into_iter().collect();
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"foo":"bar"}"#);
        let back: Context = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }
}
