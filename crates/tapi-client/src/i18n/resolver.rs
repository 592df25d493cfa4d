use std::{fmt, sync::Arc};

use futures_core::Stream;
use serde_json::{Map as JsonMap, Value};
use tokio::sync::watch;
use tokio_stream::{StreamExt, wrappers::WatchStream};
use tracing::warn;

use super::{FALLBACK_LOCALE, LocaleContext, TranslationTable, TranslationTree};

/// Replaces every `{name}` in `template` whose name appears in `values`.
///
/// The template is scanned once; substituted text is never rescanned, so a value that
/// itself contains `{other}` stays literal. Unknown names are left untouched and the
/// first entry wins when a name is listed twice.
pub fn interpolate<K, V>(template: &str, values: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if values.is_empty() {
        return template.to_owned();
    }

    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(['{', '}']).filter(|idx| after[*idx..].starts_with('}'))
        else {
            result.push('{');
            rest = after;
            continue;
        };
        let name = &after[..close];
        match values.iter().find(|(key, _)| key.as_ref() == name) {
            Some((_, value)) => result.push_str(value.as_ref()),
            None => {
                result.push('{');
                result.push_str(name);
                result.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    result.push_str(rest);
    result
}

/// String form used when a JSON value is substituted into a template.
fn display_json(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Translation view bound to one locale; lookups read the table at call time.
#[derive(Clone)]
pub struct Catalog {
    table: Arc<TranslationTable>,
    locale: String,
}

impl Catalog {
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Template for `key` from the bound locale, then the fallback locale.
    pub fn template(&self, key: &str) -> Option<String> {
        let found = self.lookup_in(&self.locale, key);
        if found.is_some() || self.locale == FALLBACK_LOCALE {
            return found;
        }
        self.lookup_in(FALLBACK_LOCALE, key)
    }

    pub fn resolve<K, V>(&self, key: &str, vars: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match self.template(key) {
            Some(template) => interpolate(&template, vars),
            None => key.to_owned(),
        }
    }

    pub fn resolve_json(&self, key: &str, vars: &JsonMap<String, Value>) -> String {
        let vars: Vec<(&str, String)> =
            vars.iter().map(|(name, value)| (name.as_str(), display_json(value))).collect();
        self.resolve(key, vars.as_slice())
    }

    pub fn t(&self, key: &str) -> String {
        self.resolve::<&str, &str>(key, &[])
    }

    fn lookup_in(&self, locale: &str, key: &str) -> Option<String> {
        let tree = self.table.get(locale)?;
        tree.lookup(key).map(str::to_owned)
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog").field("locale", &self.locale).finish()
    }
}

/// Translation table plus the current-locale cell.
#[derive(Debug, Clone)]
pub struct Translator {
    table: Arc<TranslationTable>,
    locale: LocaleContext,
}

impl Translator {
    pub fn new(table: Arc<TranslationTable>, locale: LocaleContext) -> Self {
        Self { table, locale }
    }

    /// Translator over the bundled English table, starting in `en`.
    pub fn with_builtin() -> Self {
        Self::new(Arc::new(TranslationTable::with_builtin()), LocaleContext::default())
    }

    pub fn table(&self) -> &Arc<TranslationTable> {
        &self.table
    }

    pub fn locale_context(&self) -> &LocaleContext {
        &self.locale
    }

    pub fn current_locale(&self) -> String {
        self.locale.current()
    }

    /// Switches the current locale. Unknown locales are accepted; lookups then fall
    /// back to English.
    pub fn set_locale(&self, code: &str) {
        self.locale.set(code);
        if !self.table.contains(code) {
            warn!(
                locale = code,
                "language not found in translations, using fallback for missing keys"
            );
        }
    }

    pub fn register_locale(&self, code: impl Into<String>, tree: TranslationTree) {
        self.table.register(code, tree);
    }

    pub fn available_locales(&self) -> Vec<String> {
        self.table.locales()
    }

    /// View bound to the current locale.
    pub fn catalog(&self) -> Catalog {
        self.catalog_for(self.current_locale())
    }

    fn catalog_for(&self, locale: String) -> Catalog {
        Catalog { table: self.table.clone(), locale }
    }

    pub fn resolve<K, V>(&self, key: &str, vars: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.catalog().resolve(key, vars)
    }

    pub fn resolve_json(&self, key: &str, vars: &JsonMap<String, Value>) -> String {
        self.catalog().resolve_json(key, vars)
    }

    pub fn t(&self, key: &str) -> String {
        self.catalog().t(key)
    }

    /// Yields the current catalog immediately, then a fresh one on every locale change.
    pub fn subscribe(&self) -> impl Stream<Item = Catalog> + Send + 'static {
        let translator = self.clone();
        WatchStream::new(self.locale.subscribe()).map(move |locale| translator.catalog_for(locale))
    }

    /// Raw receiver for callers that prefer `watch` semantics.
    pub fn watch_locale(&self) -> watch::Receiver<String> {
        self.locale.subscribe()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::with_builtin()
    }
}
