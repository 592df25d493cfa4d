//! Native (in-process) command bridge.

use std::{collections::BTreeMap, fmt, future::Future, pin::Pin, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use super::CommandArgs;

/// Rejection value returned by a native command handler.
///
/// Desktop shells reject with an arbitrary serialisable value; the common case is a
/// plain message string.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeError {
    payload: Value,
}

impl BridgeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { payload: Value::String(message.into()) }
    }

    pub fn from_value(payload: Value) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Value::String(message) => f.write_str(message),
            other => write!(f, "{other}"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Transport used in native mode to reach command handlers living in the host process.
#[async_trait]
pub trait NativeBridge: Send + Sync {
    async fn invoke(&self, command: &str, args: CommandArgs) -> Result<Value, BridgeError>;
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, BridgeError>> + Send>>;
type Handler = Arc<dyn Fn(CommandArgs) -> HandlerFuture + Send + Sync>;

/// Name-indexed table of async command handlers, the in-process counterpart of a
/// desktop shell's invoke handler.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BridgeError>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |args| Box::pin(handler(args)));
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn with<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BridgeError>> + Send + 'static,
    {
        self.register(name, handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl NativeBridge for CommandRegistry {
    async fn invoke(&self, command: &str, args: CommandArgs) -> Result<Value, BridgeError> {
        let handler = self
            .handlers
            .get(command)
            .cloned()
            .ok_or_else(|| BridgeError::new(format!("command {command} not found")))?;
        handler(args).await
    }
}
