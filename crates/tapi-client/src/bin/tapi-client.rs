use std::{path::PathBuf, process, sync::Arc};

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Args, CommandFactory, FromArgMatches, Parser, Subcommand, builder::Arg};
use serde_json::{Map as JsonMap, Value};
use tapi_client::{
    BridgeError, Catalog, ClientConfig, CommandArgs, CommandRegistry, ConfigError, DispatchError,
    Dispatcher, LocaleError, Mode, Translator,
    i18n::{DEFAULT_LOCALE, detect_locale, load_locale_dir, match_locale},
    logging::{self, LogOptions},
};
use url::Url;

const I18N_PREFIX: &str = "i18n:";

#[derive(Parser, Debug)]
#[command(name = "tapi-client", version, about = "i18n:cli.about")]
struct Cli {
    #[arg(long, global = true, value_name = "FILE", help = "i18n:cli.args.config")]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "MODE", help = "i18n:cli.args.mode")]
    mode: Option<Mode>,

    #[arg(long, global = true, value_name = "URL", help = "i18n:cli.args.server_url")]
    server_url: Option<Url>,

    #[arg(long, global = true, value_name = "CODE", help = "i18n:cli.args.lang")]
    lang: Option<String>,

    #[arg(long, global = true, value_name = "DIR", help = "i18n:cli.args.locales_dir")]
    locales_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR", help = "i18n:cli.args.log_json")]
    log_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "i18n:cli.command.exec")]
    Exec(ExecArgs),

    #[command(name = "t", about = "i18n:cli.command.t")]
    Translate(TranslateArgs),

    #[command(about = "i18n:cli.command.locales")]
    Locales,
}

#[derive(Args, Debug)]
struct ExecArgs {
    #[arg(value_name = "COMMAND", help = "i18n:cli.args.exec_command")]
    command: String,

    #[arg(
        long = "arg",
        value_name = "KEY=VALUE",
        value_parser = parse_pair,
        action = ArgAction::Append,
        help = "i18n:cli.args.exec_arg"
    )]
    args: Vec<(String, String)>,

    #[arg(long = "json", value_name = "OBJECT", help = "i18n:cli.args.exec_json")]
    json: Option<String>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    #[arg(value_name = "KEY", help = "i18n:cli.args.t_key")]
    key: String,

    #[arg(
        long = "var",
        value_name = "NAME=VALUE",
        value_parser = parse_pair,
        action = ArgAction::Append,
        help = "i18n:cli.args.t_var"
    )]
    vars: Vec<(String, String)>,
}

#[tokio::main]
async fn main() {
    let translator = Translator::with_builtin();
    let command = localize_command(Cli::command(), &translator.catalog());

    let mut matches = command.get_matches();
    let cli = Cli::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit());

    let _guard = match logging::init_tracing(LogOptions {
        json_dir: cli.log_json.clone(),
        default_filter: Some("warn".to_string()),
    }) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{} {err:#}", translator.t("errors.prefix"));
            process::exit(1);
        }
    };

    if let Err(err) = run(cli, &translator).await {
        let catalog = translator.catalog();
        eprintln!("{} {}", catalog.t("errors.prefix"), render_error(&catalog, &err));
        process::exit(1);
    }
}

async fn run(cli: Cli, translator: &Translator) -> Result<()> {
    let config = resolve_config(&cli)?;
    prepare_translator(&config, translator)?;

    match cli.command {
        Command::Exec(args) => handle_exec(&config, args).await,
        Command::Translate(args) => {
            let vars: Vec<(&str, &str)> =
                args.vars.iter().map(|(name, value)| (name.as_str(), value.as_str())).collect();
            println!("{}", translator.resolve(&args.key, vars.as_slice()));
            Ok(())
        }
        Command::Locales => {
            handle_locales(translator);
            Ok(())
        }
    }
}

/// Config file, then `TAPI_*` variables, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    config.apply_env()?;

    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(url) = &cli.server_url {
        config.server_url = url.clone();
    }
    if let Some(lang) = &cli.lang {
        config.locale = Some(lang.clone());
    }
    if let Some(dir) = &cli.locales_dir {
        config.locales_dir = Some(dir.clone());
    }
    Ok(config)
}

fn prepare_translator(config: &ClientConfig, translator: &Translator) -> Result<()> {
    if let Some(dir) = &config.locales_dir {
        for (code, tree) in load_locale_dir(dir)? {
            translator.register_locale(code, tree);
        }
    }

    let available = translator.available_locales();
    let locale = match &config.locale {
        Some(requested) => match_locale(requested, &available).unwrap_or_else(|| requested.clone()),
        None => detect_locale(&available).unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
    };
    translator.set_locale(&locale);
    Ok(())
}

async fn handle_exec(config: &ClientConfig, args: ExecArgs) -> Result<()> {
    let registry = CommandRegistry::new().with("get_app_version", |_args| async {
        Ok::<_, BridgeError>(Value::String(env!("CARGO_PKG_VERSION").to_string()))
    });
    let dispatcher = Dispatcher::from_config(config, Arc::new(registry));

    let command_args = build_args(args.json.as_deref(), &args.args)?;
    let value = dispatcher.execute(&args.command, command_args).await?;
    let rendered =
        serde_json::to_string_pretty(&value).context("failed to render command result")?;
    println!("{rendered}");
    Ok(())
}

fn handle_locales(translator: &Translator) {
    let catalog = translator.catalog();
    let locales = translator.available_locales();
    if locales.is_empty() {
        println!("{}", catalog.t("cli.locales_empty"));
        return;
    }
    for code in locales {
        if code == catalog.locale() {
            println!("{}", catalog.resolve("cli.locale_active", &[("code", code.as_str())]));
        } else {
            println!("{code}");
        }
    }
}

/// `--json` object first, then each `--arg` on top of it.
fn build_args(json: Option<&str>, pairs: &[(String, String)]) -> Result<CommandArgs> {
    let mut args = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("invalid --json value")? {
            Value::Object(map) => map,
            _ => bail!(CliMessage::new("errors.json_not_object", Vec::new())),
        },
        None => JsonMap::new(),
    };
    for (key, raw) in pairs {
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
        args.insert(key.clone(), value);
    }
    Ok(args)
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        anyhow!(CliMessage::new("errors.pair_format", vec![("value", raw.to_string())]))
    })?;
    if name.trim().is_empty() {
        bail!(CliMessage::new("errors.pair_name_empty", vec![("value", raw.to_string())]));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

/// Error raised by the binary itself, rendered through the translator like library errors.
#[derive(Debug)]
struct CliMessage {
    key: &'static str,
    placeholders: Vec<(&'static str, String)>,
}

impl CliMessage {
    fn new(key: &'static str, placeholders: Vec<(&'static str, String)>) -> Self {
        Self { key, placeholders }
    }
}

impl std::fmt::Display for CliMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let catalog = Translator::with_builtin().catalog();
        f.write_str(&catalog.resolve(self.key, self.placeholders.as_slice()))
    }
}

impl std::error::Error for CliMessage {}

fn render_error(catalog: &Catalog, err: &anyhow::Error) -> String {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<DispatchError>() {
            return catalog.resolve(err.message_key(), err.placeholders().as_slice());
        }
        if let Some(err) = cause.downcast_ref::<ConfigError>() {
            return catalog.resolve(err.message_key(), err.placeholders().as_slice());
        }
        if let Some(err) = cause.downcast_ref::<LocaleError>() {
            return catalog.resolve(err.message_key(), err.placeholders().as_slice());
        }
        if let Some(err) = cause.downcast_ref::<CliMessage>() {
            return catalog.resolve(err.key, err.placeholders.as_slice());
        }
    }
    format!("{err:#}")
}

fn localize_command(mut command: clap::Command, catalog: &Catalog) -> clap::Command {
    if let Some(about) =
        command.get_about().and_then(|styled| translate_placeholder(catalog, &styled.to_string()))
    {
        command = command.about(about);
    }
    command = command.mut_args(|arg| localize_arg(arg, catalog));
    command = command.mut_subcommands(|sub| localize_command(sub, catalog));
    command
}

fn localize_arg(mut arg: Arg, catalog: &Catalog) -> Arg {
    if let Some(help) =
        arg.get_help().and_then(|styled| translate_placeholder(catalog, &styled.to_string()))
    {
        arg = arg.help(help);
    }
    arg
}

fn translate_placeholder(catalog: &Catalog, text: &str) -> Option<String> {
    text.strip_prefix(I18N_PREFIX).map(|key| catalog.t(key))
}
