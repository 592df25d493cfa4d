use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use tracing::{debug, warn};

use super::{FALLBACK_LOCALE, tree::TranslationTree};

const BUILTIN_EN: &str = include_str!("../../locales/en.json");

type Trees = HashMap<String, Arc<TranslationTree>>;

/// Locale code to translation tree map.
///
/// Writers copy the current map, modify the copy and swap it in; readers clone the
/// shared pointer and never observe a half-registered tree.
#[derive(Default)]
pub struct TranslationTable {
    trees: RwLock<Arc<Trees>>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with the bundled English strings.
    pub fn with_builtin() -> Self {
        let table = Self::new();
        match TranslationTree::from_json_str(BUILTIN_EN) {
            Ok(tree) => table.register(FALLBACK_LOCALE, tree),
            Err(err) => warn!(error = %err, "bundled English translations are invalid"),
        }
        table
    }

    /// Sets (or replaces) the whole tree for `code`.
    pub fn register(&self, code: impl Into<String>, tree: TranslationTree) {
        let code = code.into();
        let tree = Arc::new(tree);
        let mut guard = self.trees.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = (**guard).clone();
        let replaced = next.insert(code.clone(), tree).is_some();
        *guard = Arc::new(next);
        debug!(locale = %code, replaced, "registered translations");
    }

    pub fn get(&self, code: &str) -> Option<Arc<TranslationTree>> {
        self.snapshot().get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.snapshot().contains_key(code)
    }

    /// Registered locale codes, sorted.
    pub fn locales(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.snapshot().keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn snapshot(&self) -> Arc<Trees> {
        let guard = self.trees.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }
}

impl fmt::Debug for TranslationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationTable").field("locales", &self.locales()).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tree(value: serde_json::Value) -> TranslationTree {
        TranslationTree::from_json(value).unwrap()
    }

    #[test]
    fn builtin_table_contains_english() {
        let table = TranslationTable::with_builtin();
        assert_eq!(table.locales(), vec!["en".to_string()]);
        let en = table.get("en").unwrap();
        assert_eq!(en.lookup("settings.title"), Some("Settings"));
        assert!(en.lookup("errors.unmapped_command").is_some());
    }

    #[test]
    fn registration_replaces_the_whole_tree() {
        let table = TranslationTable::new();
        table.register("fr", tree(json!({ "settings": { "title": "Paramètres" }, "old": "x" })));
        table.register("fr", tree(json!({ "greeting": "Bonjour" })));

        let fr = table.get("fr").unwrap();
        assert_eq!(fr.lookup("greeting"), Some("Bonjour"));
        assert_eq!(fr.lookup("old"), None);
        assert_eq!(fr.lookup("settings.title"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn readers_keep_their_snapshot_across_registration() {
        let table = TranslationTable::new();
        table.register("de", tree(json!({ "title": "Einstellungen" })));
        let before = table.get("de").unwrap();
        table.register("de", tree(json!({ "title": "Optionen" })));

        assert_eq!(before.lookup("title"), Some("Einstellungen"));
        assert_eq!(table.get("de").unwrap().lookup("title"), Some("Optionen"));
    }

    #[test]
    fn locales_are_sorted() {
        let table = TranslationTable::new();
        for code in ["tr", "en", "ja"] {
            table.register(code, TranslationTree::empty());
        }
        assert_eq!(table.locales(), vec!["en", "ja", "tr"]);
        assert!(table.contains("ja"));
        assert!(!table.contains("zh"));
    }
}
