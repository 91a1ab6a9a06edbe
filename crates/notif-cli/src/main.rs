use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use notif_core::catalog::IntensityLevel;
use notif_core::catalog::RuleCatalog;
use notif_core::catalog::RuleCategory;
use notif_core::config::Config;
use notif_core::state::ViewState;
use notif_exec::adapters::FileRuleStore;
use notif_exec::engine::SettingsEngine;
use tracing_subscriber::EnvFilter;

const DEFAULT_RULES_PATH: &str = "notif-rules.json";

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NOTIF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Toggle { category: RuleCategory, checked: bool },
    AddKeyword(String),
    RemoveKeyword(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    command: Command,
    rules: PathBuf,
    config: Option<PathBuf>,
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let Some(first) = args.first() else {
        print_help();
        return Ok(());
    };

    match first.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("notif {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => {
            let invocation = parse_invocation(args)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(execute(invocation))
        }
    }
}

fn parse_invocation(args: Vec<String>) -> Result<Invocation, Box<dyn std::error::Error>> {
    let mut positional = Vec::new();
    let mut rules = None;
    let mut config = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--rules" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--rules requires a path".into());
                };
                rules = Some(PathBuf::from(value));
                i += 2;
            }
            "--config" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--config requires a path".into());
                };
                config = Some(PathBuf::from(value));
                i += 2;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let command = match positional
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .as_slice()
    {
        ["show"] => Command::Show,
        ["toggle", category, state] => {
            let Some(category) = RuleCategory::parse(category) else {
                return Err(format!("unknown category: {category}").into());
            };
            let checked = match *state {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                other => return Err(format!("expected on|off, got: {other}").into()),
            };
            Command::Toggle { category, checked }
        }
        ["keyword", "add", text] => Command::AddKeyword(text.to_string()),
        ["keyword", "remove", text] => Command::RemoveKeyword(text.to_string()),
        _ => {
            print_help();
            return Err(format!("unsupported command: {}", positional.join(" ")).into());
        }
    };

    Ok(Invocation {
        command,
        rules: rules.unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_PATH)),
        config,
    })
}

fn load_config(explicit: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(Config::load(path)?);
    }
    let Some(default_path) = dirs::config_dir().map(|dir| dir.join("notif").join("config.toml"))
    else {
        return Ok(Config::default());
    };
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "loading config");
        return Ok(Config::load(default_path)?);
    }
    Ok(Config::default())
}

async fn execute(invocation: Invocation) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(invocation.config.as_ref())?;
    let catalog = RuleCatalog::from_config(&config.catalog);
    let seed_catalog = catalog.clone();
    let keyword_actions = catalog
        .standard_actions(RuleCategory::Keywords, IntensityLevel::Noisy)
        .actions()
        .to_vec();
    let store = Arc::new(
        FileRuleStore::open(&invocation.rules, move || seed_catalog.default_rules())?
            .with_keyword_actions(keyword_actions),
    );

    let engine = SettingsEngine::spawn(store, catalog, config.watched.iter().copied());
    match invocation.command {
        Command::Show => {}
        Command::Toggle { category, checked } => engine.update(category, checked).await,
        Command::AddKeyword(text) => engine.add(text).await,
        Command::RemoveKeyword(text) => engine.remove(text).await,
    }
    engine.refresh().await;
    let view = engine.snapshot();
    engine.shutdown().await;

    print_view(&view)?;
    Ok(())
}

fn print_view(view: &ViewState) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(view)?);
    let hidden = view
        .watched
        .iter()
        .filter(|category| view.is_rule_out_of_sync(**category))
        .map(|category| category.label())
        .collect::<Vec<_>>();
    if !hidden.is_empty() {
        eprintln!("out of sync: {}", hidden.join(", "));
    }
    for (keyword, pending) in &view.pending_keywords {
        eprintln!("unconfirmed: {keyword} ({})", pending.label());
    }
    Ok(())
}

fn print_help() {
    println!("notif {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  notif show [--rules PATH] [--config PATH]");
    println!("  notif toggle CATEGORY on|off [--rules PATH] [--config PATH]");
    println!("  notif keyword add TEXT [--rules PATH]");
    println!("  notif keyword remove TEXT [--rules PATH]");
    println!("  notif --help");
    println!("  notif --version");
    println!();
    println!("Categories:");
    for category in RuleCategory::ALL {
        println!("  {}", category.label());
    }
}
