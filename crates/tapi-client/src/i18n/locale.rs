use std::{env, sync::Arc};

use locale_config::Locale;
use tokio::sync::watch;

use crate::config::LANG_ENV_KEY;

/// Locale active before anything else is chosen.
pub const DEFAULT_LOCALE: &str = "en";

/// Shared current-locale cell. Clones observe and update the same value.
#[derive(Debug, Clone)]
pub struct LocaleContext {
    tx: Arc<watch::Sender<String>>,
}

impl LocaleContext {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Stores `code`; subscribers are only woken when the value actually changes.
    pub fn set(&self, code: impl Into<String>) -> bool {
        let code = code.into();
        self.tx.send_if_modified(move |current| {
            if *current == code {
                false
            } else {
                *current = code;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for LocaleContext {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

/// Picks a starting locale among `available` from `TAPI_LANG`, then from the OS locale.
pub fn detect_locale<S: AsRef<str>>(available: &[S]) -> Option<String> {
    if let Ok(value) = env::var(LANG_ENV_KEY) {
        if let Some(code) = match_locale(&value, available) {
            return Some(code);
        }
    }

    let locale = Locale::user_default();
    for (_category, tag) in locale.tags() {
        if let Some(code) = match_locale(tag.as_ref(), available) {
            return Some(code);
        }
    }

    None
}

/// Matches a raw language tag against registered codes: exact match first, then the
/// primary language subtag. Returns the registered spelling.
pub fn match_locale<S: AsRef<str>>(raw: &str, available: &[S]) -> Option<String> {
    let wanted = normalize_tag(raw)?;
    let candidates: Vec<(String, &str)> = available
        .iter()
        .filter_map(|code| normalize_tag(code.as_ref()).map(|norm| (norm, code.as_ref())))
        .collect();

    if let Some((_, code)) = candidates.iter().find(|(norm, _)| *norm == wanted) {
        return Some(code.to_string());
    }

    let primary = primary_subtag(&wanted);
    candidates
        .iter()
        .find(|(norm, _)| primary_subtag(norm) == primary)
        .map(|(_, code)| code.to_string())
}

/// Lowercases, turns `_` into `-` and drops encoding (`.UTF-8`) and modifier (`@euro`)
/// suffixes. Accepts `KEY=value` pairs as reported by some platforms.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let mut normalized = raw
        .trim()
        .split('=')
        .next_back()
        .unwrap_or(raw)
        .replace('_', "-")
        .to_ascii_lowercase();

    if let Some(idx) = normalized.find('@') {
        normalized.truncate(idx);
    }
    if let Some(idx) = normalized.find('.') {
        normalized.truncate(idx);
    }

    if normalized.is_empty() || normalized == "c" || normalized == "posix" {
        return None;
    }
    Some(normalized)
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}
