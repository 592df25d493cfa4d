use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::LocaleError;

/// Nested translation document: string leaves under string-keyed nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationTree {
    Leaf(String),
    Node(BTreeMap<String, TranslationTree>),
}

impl TranslationTree {
    pub fn empty() -> Self {
        TranslationTree::Node(BTreeMap::new())
    }

    /// Converts a parsed JSON document, rejecting values that are neither strings nor objects.
    pub fn from_json(value: Value) -> Result<Self, LocaleError> {
        convert(value, &mut Vec::new())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(value).map_err(<serde_json::Error as serde::de::Error>::custom)
    }

    /// Walks `key` segment by segment (split on `.`).
    ///
    /// Returns `None` when a segment is missing, when the walk reaches a leaf before
    /// the key is exhausted, when the key ends on a node, or when the leaf is empty.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut node = self;
        for segment in key.split('.') {
            match node {
                TranslationTree::Node(children) => node = children.get(segment)?,
                TranslationTree::Leaf(_) => return None,
            }
        }
        match node {
            TranslationTree::Leaf(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Number of leaves in the tree.
    pub fn len(&self) -> usize {
        match self {
            TranslationTree::Leaf(_) => 1,
            TranslationTree::Node(children) => children.values().map(TranslationTree::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dotted keys of every leaf, in key order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(self, &mut String::new(), &mut keys);
        keys
    }
}

impl Default for TranslationTree {
    fn default() -> Self {
        Self::empty()
    }
}

fn convert(value: Value, path: &mut Vec<String>) -> Result<TranslationTree, LocaleError> {
    match value {
        Value::String(text) => Ok(TranslationTree::Leaf(text)),
        Value::Object(map) => {
            let mut children = BTreeMap::new();
            for (key, child) in map {
                path.push(key);
                let converted = convert(child, path)?;
                let key = path.pop().unwrap_or_default();
                children.insert(key, converted);
            }
            Ok(TranslationTree::Node(children))
        }
        other => Err(LocaleError::InvalidTree { key: path.join("."), found: json_kind(&other) }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn collect_keys(tree: &TranslationTree, prefix: &mut String, out: &mut Vec<String>) {
    match tree {
        TranslationTree::Leaf(_) => out.push(prefix.clone()),
        TranslationTree::Node(children) => {
            for (key, child) in children {
                let restore = prefix.len();
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(key);
                collect_keys(child, prefix, out);
                prefix.truncate(restore);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> TranslationTree {
        TranslationTree::from_json(json!({
            "settings": { "title": "Settings", "theme": { "dark": "Dark" } },
            "greeting": "Hello, {name}!",
            "blank": ""
        }))
        .unwrap()
    }

    #[test]
    fn walks_nested_keys() {
        let tree = sample();
        assert_eq!(tree.lookup("settings.title"), Some("Settings"));
        assert_eq!(tree.lookup("settings.theme.dark"), Some("Dark"));
        assert_eq!(tree.lookup("greeting"), Some("Hello, {name}!"));
    }

    #[test]
    fn missing_segments_and_containers_are_not_found() {
        let tree = sample();
        assert_eq!(tree.lookup("settings.missing"), None);
        // Walk hits a leaf before the key is exhausted.
        assert_eq!(tree.lookup("greeting.extra"), None);
        // Key ends on a node.
        assert_eq!(tree.lookup("settings"), None);
        assert_eq!(tree.lookup(""), None);
    }

    #[test]
    fn empty_leaves_count_as_missing() {
        assert_eq!(sample().lookup("blank"), None);
    }

    #[test]
    fn rejects_non_string_leaves_with_their_path() {
        let err = TranslationTree::from_json(json!({ "settings": { "count": 3 } })).unwrap_err();
        match err {
            LocaleError::InvalidTree { key, found } => {
                assert_eq!(key, "settings.count");
                assert_eq!(found, "a number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn lists_leaf_keys() {
        let tree = sample();
        assert_eq!(tree.len(), 4);
        assert_eq!(
            tree.keys(),
            vec!["blank", "greeting", "settings.theme.dark", "settings.title"]
        );
        assert!(TranslationTree::empty().is_empty());
    }

    #[test]
    fn parses_from_raw_json() {
        let tree = TranslationTree::from_json_str(r#"{"a":{"b":"c"}}"#).unwrap();
        assert_eq!(tree.lookup("a.b"), Some("c"));
        assert!(TranslationTree::from_json_str(r#"{"a":[1]}"#).is_err());
    }
}
