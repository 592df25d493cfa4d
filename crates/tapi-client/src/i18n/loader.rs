use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::TranslationTree;
use crate::error::LocaleError;

const LOCALE_EXTENSION: &str = "json";

/// Parses a single locale document. The locale code is the file stem (`fr.json` -> `fr`).
pub fn load_locale_file(path: &Path) -> Result<(String, TranslationTree), LocaleError> {
    let code = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| LocaleError::InvalidFileName { path: path.to_path_buf() })?
        .to_string();

    let raw = fs::read_to_string(path)
        .map_err(|source| LocaleError::ReadFile { path: path.to_path_buf(), source })?;
    let value = serde_json::from_str(&raw)
        .map_err(|source| LocaleError::ParseJson { path: path.to_path_buf(), source })?;
    let tree = TranslationTree::from_json(value)?;
    debug!(locale = %code, path = %path.display(), keys = tree.len(), "loaded locale file");
    Ok((code, tree))
}

/// Loads every `*.json` file in `dir`, sorted by locale code. Other entries are skipped.
pub fn load_locale_dir(dir: &Path) -> Result<Vec<(String, TranslationTree)>, LocaleError> {
    let entries = fs::read_dir(dir)
        .map_err(|source| LocaleError::ReadDirectory { path: dir.to_path_buf(), source })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|source| LocaleError::ReadDirectory { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        let is_locale = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(LOCALE_EXTENSION))
                .unwrap_or(false);
        if is_locale {
            paths.push(path);
        }
    }

    let mut locales = paths
        .iter()
        .map(|path| load_locale_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    locales.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(locales)
}
