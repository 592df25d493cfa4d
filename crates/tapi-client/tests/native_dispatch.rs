use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tapi_client::{
    BridgeError, ClientConfig, CommandArgs, CommandRegistry, DispatchError, Dispatcher, Mode,
    NativeBridge,
};
use tokio::runtime::Runtime;

fn test_runtime() -> Runtime {
    Runtime::new().expect("create tokio runtime")
}

fn settings_registry(store: Arc<Mutex<Value>>) -> CommandRegistry {
    let load_store = store.clone();
    CommandRegistry::new()
        .with("load_settings", move |_args| {
            let store = load_store.clone();
            async move { Ok::<_, BridgeError>(store.lock().unwrap().clone()) }
        })
        .with("save_settings", move |args: CommandArgs| {
            let store = store.clone();
            async move {
                if args.is_empty() {
                    return Err(BridgeError::from_value(json!({ "code": "EMPTY" })));
                }
                *store.lock().unwrap() = Value::Object(args);
                Ok(Value::Null)
            }
        })
}

#[test]
fn settings_round_trip_through_the_bridge() {
    test_runtime().block_on(async {
        let store = Arc::new(Mutex::new(json!({})));
        let dispatcher =
            Dispatcher::from_config(&ClientConfig::default(), Arc::new(settings_registry(store)));
        assert_eq!(dispatcher.mode(), Mode::Native);

        let mut args = CommandArgs::new();
        args.insert("theme".into(), json!("dark"));
        assert_eq!(dispatcher.execute("save_settings", args).await.unwrap(), Value::Null);
        assert_eq!(
            dispatcher.execute_default("load_settings").await.unwrap(),
            json!({ "theme": "dark" })
        );
    });
}

#[test]
fn structured_rejections_are_not_rewrapped() {
    test_runtime().block_on(async {
        let store = Arc::new(Mutex::new(json!({})));
        let dispatcher = Dispatcher::native(Arc::new(settings_registry(store)));

        let err = dispatcher.execute_default("save_settings").await.unwrap_err();
        match err {
            DispatchError::Bridge(inner) => {
                assert_eq!(inner.payload(), &json!({ "code": "EMPTY" }))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    });
}

struct EchoBridge;

#[async_trait]
impl NativeBridge for EchoBridge {
    async fn invoke(&self, command: &str, args: CommandArgs) -> Result<Value, BridgeError> {
        Ok(json!({ "command": command, "args": args }))
    }
}

#[test]
fn any_bridge_implementation_can_back_native_mode() {
    test_runtime().block_on(async {
        let dispatcher = Dispatcher::native(Arc::new(EchoBridge));
        let mut args = CommandArgs::new();
        args.insert("n".into(), json!(1));
        let value = dispatcher.execute("anything_at_all", args).await.unwrap();
        assert_eq!(value, json!({ "command": "anything_at_all", "args": { "n": 1 } }));
    });
}
