use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::hot_reload::watch_table;
use crate::logging::{init_logging, LogFormat};
use crate::method::Method;
use crate::router::{MatchOutcome, Router};
use crate::runtime_config::RuntimeConfig;
use crate::table::{load_table, TableGroups};

/// Command-line interface for muxtree
///
/// Every command operates on a route table file (YAML, JSON or TOML).
#[derive(Parser)]
#[command(name = "muxtree")]
#[command(about = "Inspect and exercise muxtree route tables", long_about = None)]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load a route table and report whether every route registers
    Check {
        /// Path to the route table
        #[arg(short, long)]
        table: PathBuf,
    },
    /// List the routes of a table in registration order
    Routes {
        /// Path to the route table
        #[arg(short, long)]
        table: PathBuf,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Match a request against a table
    Match {
        /// Path to the route table
        #[arg(short, long)]
        table: PathBuf,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request host, for host-qualified patterns
        #[arg(long, default_value = "")]
        host: String,

        /// Request path
        path: String,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Build a URL from a route name or pattern
    Url {
        /// Path to the route table
        #[arg(short, long)]
        table: PathBuf,

        /// Route name or registered pattern
        route: String,

        /// Parameter value as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Text for a trailing /* wildcard
        #[arg(long, default_value = "")]
        tail: String,
    },
    /// Watch a table and report every reload until interrupted
    Watch {
        /// Path to the route table
        #[arg(short, long)]
        table: PathBuf,
    },
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn load_router(table: &Path) -> anyhow::Result<(Router, TableGroups)> {
    load_table(table)?
        .build_router(RuntimeConfig::from_env())
        .with_context(|| format!("failed to apply route table {}", table.display()))
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if:
/// - Logging cannot be initialised
/// - The route table cannot be read, parsed or applied
/// - A URL cannot be built
/// - The hot reload watcher cannot be created
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level)?;
    let stdout = io::stdout();
    execute(&cli.command, &mut stdout.lock())
}

/// Run one command, writing its report to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute(command: &Commands, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Commands::Check { table } => {
            let (router, groups) = load_router(table)?;
            writeln!(
                out,
                "ok: {} routes, {} groups in {}",
                router.len(),
                groups.len(),
                table.display()
            )?;
        }
        Commands::Routes { table, json } => {
            let (router, _) = load_router(table)?;
            let routes = router.routes();
            if *json {
                let listed: Vec<_> = routes
                    .iter()
                    .map(|r| {
                        json!({
                            "pattern": &*r.pattern,
                            "allow": &*r.allow,
                            "handlers": r.handlers.iter()
                                .map(|(m, h)| json!({ "method": m.as_str(), "handler": &**h }))
                                .collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&listed)?)?;
            } else {
                for route in &routes {
                    for (method, handler) in &route.handlers {
                        writeln!(out, "{method:<8} {} -> {handler}", route.pattern)?;
                    }
                }
            }
        }
        Commands::Match {
            table,
            method,
            host,
            path,
            json,
        } => {
            let method: Method = method.parse()?;
            let (router, _) = load_router(table)?;
            let outcome = router.route(host, path, method);
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&outcome_json(&outcome))?)?;
            } else {
                writeln!(out, "{}", describe(&outcome))?;
            }
        }
        Commands::Url {
            table,
            route,
            params,
            tail,
        } => {
            let (router, _) = load_router(table)?;
            let pairs: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let url = router.url(route, pairs.as_slice(), tail)?;
            writeln!(out, "{url}")?;
        }
        Commands::Watch { table } => {
            let (router, _) = load_router(table)?;
            writeln!(out, "watching {} ({} routes)", table.display(), router.len())?;
            out.flush()?;
            let router = Arc::new(RwLock::new(router));
            let _watcher = watch_table(
                table,
                Arc::clone(&router),
                RuntimeConfig::from_env(),
                |router, groups| {
                    println!("reloaded: {} routes, {} groups", router.len(), groups.len());
                },
            )?;
            loop {
                std::thread::park();
            }
        }
    }
    Ok(())
}

fn describe(outcome: &MatchOutcome) -> String {
    match outcome {
        MatchOutcome::Found(m) => {
            let mut line = format!("found {} -> {}", m.pattern, m.handler_name);
            for (name, value) in &m.path_params {
                line.push_str(&format!(" {name}={value}"));
            }
            if let Some(tail) = &m.wildcard {
                line.push_str(&format!(" *={tail}"));
            }
            line
        }
        MatchOutcome::NotFound => "not found".to_string(),
        MatchOutcome::MethodNotAllowed { allow } => format!("method not allowed (Allow: {allow})"),
        MatchOutcome::Options { allow } => format!("options (Allow: {allow})"),
        MatchOutcome::RouteDisabled { pattern } => format!("route disabled: {pattern}"),
    }
}

fn outcome_json(outcome: &MatchOutcome) -> serde_json::Value {
    match outcome {
        MatchOutcome::Found(m) => json!({
            "outcome": outcome.kind(),
            "pattern": &*m.pattern,
            "handler": &*m.handler_name,
            "method": m.method.as_str(),
            "params": m.path_params_map(),
            "wildcard": m.wildcard,
        }),
        MatchOutcome::RouteDisabled { pattern } => json!({
            "outcome": outcome.kind(),
            "pattern": &**pattern,
        }),
        _ => json!({
            "outcome": outcome.kind(),
            "allow": outcome.allow(),
        }),
    }
}
