//! # CLI Module
//!
//! Command-line access to rule files.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Build a rule file and report conflicts or syntax errors:
//!
//! ```bash
//! routecomb check --rules routes.yaml
//! ```
//!
//! ### `routes`
//!
//! Print every route in match order:
//!
//! ```bash
//! routecomb routes --rules routes.yaml --json
//! ```
//!
//! ### `match`
//!
//! Dispatch one request and print the winning action and its captures:
//!
//! ```bash
//! routecomb match --rules routes.yaml --method GET --url '/users/42?x=1' -H accept:text/html
//! ```
//!
//! Build options come from the rule file, then `ROUTECOMB_TRIM`,
//! `ROUTECOMB_CASE` and `ROUTECOMB_DEBUG`, then `--trim` and `--case`.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use routecomb::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! run_cli(&Cli::parse(), &mut std::io::stdout())?;
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands};
