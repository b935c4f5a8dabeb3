use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};

use crate::config::load_rules;
use crate::request::Request;
use crate::router::Router;

/// Command-line interface for routecomb
#[derive(Parser)]
#[command(name = "routecomb")]
#[command(about = "Compile, inspect and exercise URL rule files", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a rule file and report errors
    Check {
        /// Rule file (YAML, TOML or JSON)
        #[arg(short, long)]
        rules: PathBuf,

        /// Accept a trailing slash wherever a rule ends
        #[arg(long, default_value_t = false)]
        trim: bool,

        /// Match case-insensitively and reject rules differing only in case
        #[arg(long, default_value_t = false)]
        case: bool,
    },
    /// Print every route in match order
    Routes {
        /// Rule file (YAML, TOML or JSON)
        #[arg(short, long)]
        rules: PathBuf,

        /// Emit JSON instead of one line per route
        #[arg(long, default_value_t = false)]
        json: bool,

        #[arg(long, default_value_t = false)]
        trim: bool,

        #[arg(long, default_value_t = false)]
        case: bool,
    },
    /// Dispatch one request against a rule file
    Match {
        /// Rule file (YAML, TOML or JSON)
        #[arg(short, long)]
        rules: PathBuf,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target, e.g. `/users/42?expand=1#top`
        #[arg(short, long)]
        url: String,

        /// Request header as `name:value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        #[arg(long, default_value_t = false)]
        trim: bool,

        #[arg(long, default_value_t = false)]
        case: bool,
    },
}

/// Run a parsed command, writing its output to `out`.
///
/// # Errors
///
/// Fails when the rule file cannot be loaded or built, when a header
/// argument is malformed, or when `match` finds no route.
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Check { rules, trim, case } => {
            let router = load_router(rules, *trim, *case)?;
            writeln!(out, "ok: {} routes", router.len())?;
        }
        Commands::Routes {
            rules,
            json,
            trim,
            case,
        } => {
            let router = load_router(rules, *trim, *case)?;
            if *json {
                serde_json::to_writer_pretty(&mut *out, router.traces())?;
                writeln!(out)?;
            } else {
                for trace in router.traces() {
                    let action = router.action(trace.action).map_or("", String::as_str);
                    writeln!(out, "{} -> {}", trace, action)?;
                }
            }
        }
        Commands::Match {
            rules,
            method,
            url,
            headers,
            trim,
            case,
        } => {
            let router = load_router(rules, *trim, *case)?;
            let mut request = Request::new(method.as_str(), url);
            for header in headers {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| anyhow!("header must be `name:value`, got `{}`", header))?;
                request = request.header(name.trim(), value.trim());
            }

            let matched = router
                .dispatch(&request)
                .ok_or_else(|| anyhow!("no route matched {} {}", method, url))?;
            writeln!(
                out,
                "{} {}",
                matched.action,
                serde_json::to_string(&matched.captures)?
            )?;
        }
    }
    Ok(())
}

fn load_router(path: &Path, trim: bool, case: bool) -> anyhow::Result<Router<String>> {
    let mut file = load_rules(path)?;
    file.options = file.options.with_env_overrides();
    file.options.trim |= trim;
    file.options.case |= case;
    file.finalize()
        .with_context(|| format!("Failed to build rules from {}", path.display()))
}
