//! Front-end plumbing for the tapi desktop app: command dispatch that works both
//! inside the native shell and as a plain web client, plus locale resolution.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod i18n;
pub mod logging;

pub use config::ClientConfig;
pub use dispatch::{
    BridgeError, CommandArgs, CommandRegistry, Dispatcher, Endpoint, EndpointMap, HttpBackend,
    HttpMethod, Mode, NativeBridge,
};
pub use error::{ConfigError, DispatchError, LocaleError};
pub use i18n::{
    Catalog, FALLBACK_LOCALE, LocaleContext, TranslationTable, TranslationTree, Translator,
};
