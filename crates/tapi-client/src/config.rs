//! Startup configuration handed to the dispatcher and the translator.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{dispatch::Mode, error::ConfigError};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

pub const MODE_ENV_KEY: &str = "TAPI_MODE";
pub const SERVER_URL_ENV_KEY: &str = "TAPI_SERVER_URL";
pub const LANG_ENV_KEY: &str = "TAPI_LANG";
pub const LOCALES_DIR_ENV_KEY: &str = "TAPI_LOCALES_DIR";

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub mode: Mode,
    /// Base URL of the tapi web server, used in server mode only.
    pub server_url: Url,
    /// Requested starting locale. `None` means detect from the environment.
    pub locale: Option<String>,
    /// Directory of additional `<code>.json` locale files.
    pub locales_dir: Option<PathBuf>,
}

/// On-disk shape; every field is optional and unknown keys are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    server_url: Option<String>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    locales_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            server_url: default_server_url(),
            locale: None,
            locales_dir: None,
        }
    }
}

fn default_server_url() -> Url {
    Url::parse(DEFAULT_SERVER_URL).unwrap_or_else(|_| unreachable!("default server URL is valid"))
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = Self::parse(&raw, path)?;
        debug!(path = %path.display(), mode = %config.mode, "loaded client config");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::parse(raw, Path::new("<inline>"))
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml_edit::de::from_str(raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        let mut config = Self::default();
        if let Some(mode) = raw.mode {
            config.mode = mode.parse()?;
        }
        if let Some(url) = raw.server_url {
            config.server_url = parse_server_url(&url)?;
        }
        config.locale = raw.locale.and_then(non_blank);
        config.locales_dir = raw.locales_dir.filter(|dir| !dir.as_os_str().is_empty());
        Ok(config)
    }

    /// Overrides fields from `TAPI_MODE`, `TAPI_SERVER_URL`, `TAPI_LANG` and
    /// `TAPI_LOCALES_DIR`.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::apply_env`] with a custom variable source. Blank values
    /// are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(non_blank);

        if let Some(mode) = get(MODE_ENV_KEY) {
            self.mode = mode.parse()?;
        }
        if let Some(url) = get(SERVER_URL_ENV_KEY) {
            self.server_url = parse_server_url(&url)?;
        }
        if let Some(locale) = get(LANG_ENV_KEY) {
            self.locale = Some(locale);
        }
        if let Some(dir) = get(LOCALES_DIR_ENV_KEY) {
            self.locales_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

fn parse_server_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim())
        .map_err(|source| ConfigError::InvalidUrl { value: value.to_string(), source })
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
