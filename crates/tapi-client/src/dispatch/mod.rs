//! Dual-mode command dispatch: native bridge or HTTP fallback.

mod bridge;
mod endpoint;
mod http;

use std::{fmt, str::FromStr, sync::Arc, time::Instant};

use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

pub use bridge::{BridgeError, CommandRegistry, NativeBridge};
pub use endpoint::{Endpoint, EndpointMap, HttpMethod};
pub use http::HttpBackend;

use crate::{config::ClientConfig, error::DispatchError};

/// Arguments passed alongside a command name.
pub type CommandArgs = serde_json::Map<String, Value>;

/// Where commands are executed, decided once by the hosting shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Running inside the desktop shell with direct command invocation.
    #[default]
    Native,
    /// Running as a plain web client talking to the tapi web server.
    Server,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Native => "native",
            Mode::Server => "server",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = crate::error::ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Mode::Native),
            "server" => Ok(Mode::Server),
            _ => Err(crate::error::ConfigError::InvalidMode { value: value.to_string() }),
        }
    }
}

#[derive(Clone)]
enum Backend {
    Native(Arc<dyn NativeBridge>),
    Server(HttpBackend),
}

/// Routes commands to exactly one of the two backends.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Backend,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Dispatcher");
        debug.field("mode", &self.mode());
        if let Backend::Server(http) = &self.backend {
            debug.field("server_url", &http.base_url().as_str());
        }
        debug.finish()
    }
}

impl Dispatcher {
    pub fn native(bridge: Arc<dyn NativeBridge>) -> Self {
        Self { backend: Backend::Native(bridge) }
    }

    pub fn server(http: HttpBackend) -> Self {
        Self { backend: Backend::Server(http) }
    }

    /// Builds the dispatcher the configuration asks for. The bridge is only used in
    /// native mode.
    pub fn from_config(config: &ClientConfig, bridge: Arc<dyn NativeBridge>) -> Self {
        match config.mode {
            Mode::Native => Self::native(bridge),
            Mode::Server => Self::server(HttpBackend::new(config.server_url.clone())),
        }
    }

    pub fn mode(&self) -> Mode {
        match self.backend {
            Backend::Native(_) => Mode::Native,
            Backend::Server(_) => Mode::Server,
        }
    }

    /// Executes `command` with empty arguments.
    pub async fn execute_default(&self, command: &str) -> Result<Value, DispatchError> {
        self.execute(command, CommandArgs::new()).await
    }

    pub async fn execute(&self, command: &str, args: CommandArgs) -> Result<Value, DispatchError> {
        let call_id = Uuid::new_v4().to_string();
        let mode = self.mode();
        let args_json = Value::Object(args.clone());
        info!(
            call_id = %call_id,
            command,
            mode = %mode,
            args = %args_json,
            "dispatching command"
        );
        let started = Instant::now();

        let result = match &self.backend {
            Backend::Native(bridge) => {
                bridge.invoke(command, args).await.map_err(DispatchError::from)
            }
            Backend::Server(http) => http.send(command, &args).await,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(value) => info!(
                call_id = %call_id,
                command,
                elapsed_ms,
                result = %value,
                "command completed"
            ),
            Err(err) => error!(
                call_id = %call_id,
                command,
                elapsed_ms,
                error = %err,
                "command failed"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use url::Url;

    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Native".parse::<Mode>().unwrap(), Mode::Native);
        assert_eq!(" server ".parse::<Mode>().unwrap(), Mode::Server);
        assert!("browser".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Native);
    }

    #[tokio::test]
    async fn native_mode_returns_bridge_result_verbatim() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = CommandRegistry::new().with("load_settings", move |_args| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BridgeError>(json!({ "theme": "dark" }))
            }
        });
        let dispatcher = Dispatcher::native(Arc::new(registry));
        assert_eq!(dispatcher.mode(), Mode::Native);

        let value = dispatcher.execute_default("load_settings").await.unwrap();
        assert_eq!(value, json!({ "theme": "dark" }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn native_mode_ignores_the_endpoint_table() {
        // `unknown_cmd` has no HTTP mapping but the bridge knows it.
        let registry = CommandRegistry::new()
            .with("unknown_cmd", |_args| async { Ok::<_, BridgeError>(json!("native")) });
        let dispatcher = Dispatcher::native(Arc::new(registry));
        assert_eq!(dispatcher.execute_default("unknown_cmd").await.unwrap(), json!("native"));
    }

    #[tokio::test]
    async fn native_failures_propagate_unchanged() {
        let registry = CommandRegistry::new().with("save_settings", |_args| async {
            Err::<Value, _>(BridgeError::new("permission denied"))
        });
        let dispatcher = Dispatcher::native(Arc::new(registry));
        let err = dispatcher.execute_default("save_settings").await.unwrap_err();
        match err {
            DispatchError::Bridge(inner) => {
                assert_eq!(inner, BridgeError::new("permission denied"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_config_honours_mode() {
        let bridge: Arc<dyn NativeBridge> = Arc::new(CommandRegistry::new());
        let mut config = ClientConfig::default();
        assert_eq!(Dispatcher::from_config(&config, bridge.clone()).mode(), Mode::Native);

        config.mode = Mode::Server;
        config.server_url = Url::parse("http://localhost:4000").unwrap();
        let dispatcher = Dispatcher::from_config(&config, bridge);
        assert_eq!(dispatcher.mode(), Mode::Server);
        assert!(format!("{dispatcher:?}").contains("localhost:4000"));
    }
}
