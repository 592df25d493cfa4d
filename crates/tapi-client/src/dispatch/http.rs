//! HTTP fallback used when the app runs as a plain web client.

use reqwest::{
    Client as ReqwestClient, Response, StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{
    CommandArgs,
    endpoint::{Endpoint, EndpointMap},
};
use crate::error::DispatchError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Server-mode backend: maps commands onto HTTP endpoints of the tapi web server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ReqwestClient,
    base_url: Url,
    endpoints: EndpointMap,
}

impl HttpBackend {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(ReqwestClient::new(), base_url, EndpointMap::default())
    }

    pub fn with_client(client: ReqwestClient, base_url: Url, endpoints: EndpointMap) -> Self {
        Self { client, base_url, endpoints }
    }

    pub fn with_endpoints(mut self, endpoints: EndpointMap) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &EndpointMap {
        &self.endpoints
    }

    pub async fn send(&self, command: &str, args: &CommandArgs) -> Result<Value, DispatchError> {
        let endpoint = self
            .endpoints
            .resolve(command)
            .ok_or_else(|| DispatchError::UnmappedCommand { command: command.to_string() })?;
        let url = self.endpoint_url(command, endpoint)?;

        let mut request = self
            .client
            .request(endpoint.method.into(), url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if endpoint.method.carries_body() {
            let body = serde_json::to_vec(args).map_err(|source| DispatchError::EncodeArgs {
                command: command.to_string(),
                source,
            })?;
            request = request.body(body);
        }

        debug!(command, method = %endpoint.method, url = %url, "sending server-mode request");
        let response = request
            .send()
            .await
            .map_err(|source| DispatchError::Transport { command: command.to_string(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::ServerError {
                command: command.to_string(),
                status: status.as_u16(),
                status_text: reason_phrase(status),
            });
        }

        decode_body(command, response).await
    }

    fn endpoint_url(&self, command: &str, endpoint: &Endpoint) -> Result<Url, DispatchError> {
        self.base_url.join(&endpoint.path).map_err(|source| DispatchError::InvalidUrl {
            command: command.to_string(),
            path: endpoint.path.clone(),
            source,
        })
    }
}

/// Canonical reason phrase, or the numeric code when the status has none.
fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or(status.as_str()).to_string()
}

async fn decode_body(command: &str, response: Response) -> Result<Value, DispatchError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains(JSON_CONTENT_TYPE))
        .unwrap_or(false);

    if is_json {
        response
            .json::<Value>()
            .await
            .map_err(|source| DispatchError::Decode { command: command.to_string(), source })
    } else {
        response
            .text()
            .await
            .map(Value::String)
            .map_err(|source| DispatchError::Transport { command: command.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths_join_onto_the_server_root() {
        let backend = HttpBackend::new(Url::parse("http://127.0.0.1:3000/app/").unwrap());
        let endpoint = Endpoint::get("/api/settings/load");
        let url = backend.endpoint_url("load_settings", &endpoint).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/api/settings/load");
    }

    #[test]
    fn reason_phrase_falls_back_to_the_numeric_code() {
        assert_eq!(reason_phrase(StatusCode::BAD_GATEWAY), "Bad Gateway");
        assert_eq!(reason_phrase(StatusCode::from_u16(599).unwrap()), "599");
    }

    #[tokio::test]
    async fn unmapped_command_fails_before_any_request() {
        // Nothing listens on port 9; an attempted request would surface as a transport error.
        let backend = HttpBackend::new(Url::parse("http://127.0.0.1:9").unwrap());
        let err = backend.send("unknown_cmd", &CommandArgs::new()).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnmappedCommand { ref command } if command == "unknown_cmd"
        ));
    }
}
