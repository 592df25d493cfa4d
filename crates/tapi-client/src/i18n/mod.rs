//! Locale tables, the current-locale cell and key resolution.

mod loader;
mod locale;
mod resolver;
mod table;
mod tree;

pub use loader::{load_locale_dir, load_locale_file};
pub use locale::{DEFAULT_LOCALE, LocaleContext, detect_locale, match_locale, normalize_tag};
pub use resolver::{Catalog, Translator, interpolate};
pub use table::TranslationTable;
pub use tree::TranslationTree;

/// Locale consulted whenever a key is missing from the current locale.
pub const FALLBACK_LOCALE: &str = "en";
