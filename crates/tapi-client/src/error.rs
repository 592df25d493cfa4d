use std::{io, path::PathBuf};

use serde_json::Error as JsonError;
use thiserror::Error;
use toml_edit::de::Error as TomlDeError;
use url::ParseError as UrlParseError;

use crate::dispatch::BridgeError;

/// Failures surfaced by [`crate::dispatch::Dispatcher::execute`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The native bridge rejected the call; the rejection is passed through as-is.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("command '{command}' is not supported in server mode")]
    UnmappedCommand { command: String },

    #[error("server error: {status_text}")]
    ServerError { command: String, status: u16, status_text: String },

    #[error("request for command '{command}' failed")]
    Transport {
        command: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode JSON response for command '{command}'")]
    Decode {
        command: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to serialise arguments for command '{command}'")]
    EncodeArgs {
        command: String,
        #[source]
        source: JsonError,
    },

    #[error("invalid endpoint '{path}' for command '{command}'")]
    InvalidUrl {
        command: String,
        path: String,
        #[source]
        source: UrlParseError,
    },
}

impl DispatchError {
    pub fn message_key(&self) -> &'static str {
        match self {
            DispatchError::Bridge(_) => "errors.bridge_failure",
            DispatchError::UnmappedCommand { .. } => "errors.unmapped_command",
            DispatchError::ServerError { .. } => "errors.server_error",
            DispatchError::Transport { .. } => "errors.transport_failed",
            DispatchError::Decode { .. } => "errors.decode_failed",
            DispatchError::EncodeArgs { .. } => "errors.encode_args_failed",
            DispatchError::InvalidUrl { .. } => "errors.invalid_endpoint",
        }
    }

    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            DispatchError::Bridge(err) => vec![("error", err.to_string())],
            DispatchError::UnmappedCommand { command } => vec![("command", command.clone())],
            DispatchError::ServerError { command, status, status_text } => vec![
                ("command", command.clone()),
                ("status", status.to_string()),
                ("status_text", status_text.clone()),
            ],
            DispatchError::Transport { command, source }
            | DispatchError::Decode { command, source } => {
                vec![("command", command.clone()), ("error", source.to_string())]
            }
            DispatchError::EncodeArgs { command, source } => {
                vec![("command", command.clone()), ("error", source.to_string())]
            }
            DispatchError::InvalidUrl { command, path, source } => vec![
                ("command", command.clone()),
                ("path", path.clone()),
                ("error", source.to_string()),
            ],
        }
    }

    /// Name of the command that failed, when the error carries one.
    pub fn command(&self) -> Option<&str> {
        match self {
            DispatchError::Bridge(_) => None,
            DispatchError::UnmappedCommand { command }
            | DispatchError::ServerError { command, .. }
            | DispatchError::Transport { command, .. }
            | DispatchError::Decode { command, .. }
            | DispatchError::EncodeArgs { command, .. }
            | DispatchError::InvalidUrl { command, .. } => Some(command),
        }
    }
}

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("failed to read locale directory {path}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read locale file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse locale file {path}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: JsonError,
    },

    #[error("translation '{key}' must be a string or an object, found {found}")]
    InvalidTree { key: String, found: &'static str },

    #[error("locale file name {path} is not a valid locale code")]
    InvalidFileName { path: PathBuf },
}

impl LocaleError {
    pub fn message_key(&self) -> &'static str {
        match self {
            LocaleError::ReadDirectory { .. } => "errors.locale_dir_read_failed",
            LocaleError::ReadFile { .. } => "errors.locale_read_failed",
            LocaleError::ParseJson { .. } => "errors.locale_parse_failed",
            LocaleError::InvalidTree { .. } => "errors.locale_invalid_tree",
            LocaleError::InvalidFileName { .. } => "errors.locale_invalid_file_name",
        }
    }

    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            LocaleError::ReadDirectory { path, source }
            | LocaleError::ReadFile { path, source } => {
                vec![("path", path.display().to_string()), ("error", source.to_string())]
            }
            LocaleError::ParseJson { path, source } => {
                vec![("path", path.display().to_string()), ("error", source.to_string())]
            }
            LocaleError::InvalidTree { key, found } => {
                vec![("key", key.clone()), ("found", found.to_string())]
            }
            LocaleError::InvalidFileName { path } => vec![("path", path.display().to_string())],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: TomlDeError,
    },

    #[error("unknown mode '{value}', expected 'native' or 'server'")]
    InvalidMode { value: String },

    #[error("invalid server URL '{value}'")]
    InvalidUrl {
        value: String,
        #[source]
        source: UrlParseError,
    },
}

impl ConfigError {
    pub fn message_key(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "errors.config_read_failed",
            ConfigError::Parse { .. } => "errors.config_parse_failed",
            ConfigError::InvalidMode { .. } => "errors.config_invalid_mode",
            ConfigError::InvalidUrl { .. } => "errors.config_invalid_url",
        }
    }

    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            ConfigError::Read { path, source } => {
                vec![("path", path.display().to_string()), ("error", source.to_string())]
            }
            ConfigError::Parse { path, source } => {
                vec![("path", path.display().to_string()), ("error", source.to_string())]
            }
            ConfigError::InvalidMode { value } => vec![("value", value.clone())],
            ConfigError::InvalidUrl { value, source } => {
                vec![("value", value.clone()), ("error", source.to_string())]
            }
        }
    }
}
