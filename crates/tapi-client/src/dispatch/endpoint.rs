//! Command name to HTTP endpoint table used in server mode.

use std::{collections::BTreeMap, fmt};

use tracing::warn;

/// HTTP methods the server-mode backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }

    /// Only POST requests carry the command arguments as a JSON body.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
}

impl Endpoint {
    pub fn get(path: impl Into<String>) -> Self {
        Self { path: path.into(), method: HttpMethod::Get }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self { path: path.into(), method: HttpMethod::Post }
    }
}

/// Static routing table for server mode. Commands absent from the table are unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMap {
    entries: BTreeMap<String, Endpoint>,
}

impl EndpointMap {
    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    pub fn with(mut self, command: impl Into<String>, endpoint: Endpoint) -> Self {
        self.insert(command, endpoint);
        self
    }

    pub fn insert(&mut self, command: impl Into<String>, endpoint: Endpoint) -> Option<Endpoint> {
        self.entries.insert(command.into(), endpoint)
    }

    /// Looks up a command, logging a warning when it has no mapping.
    pub fn resolve(&self, command: &str) -> Option<&Endpoint> {
        let endpoint = self.entries.get(command);
        if endpoint.is_none() {
            warn!(command, "command map missing for server mode");
        }
        endpoint
    }

    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(command)
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EndpointMap {
    fn default() -> Self {
        Self::empty()
            .with("load_settings", Endpoint::get("/api/settings/load"))
            .with("save_settings", Endpoint::post("/api/settings/save"))
    }
}
