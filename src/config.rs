//! # Configuration Module
//!
//! Rule files and environment overrides.
//!
//! ## Rule files
//!
//! A rule file lists rules with a named action each, plus build options.
//! YAML (`.yaml`, `.yml`), TOML (`.toml`) and JSON (anything else) are
//! accepted:
//!
//! ```yaml
//! options:
//!   trim: true
//! rules:
//!   - url: /users/*
//!     method: "{GET,HEAD}"
//!     action: show_user
//!   - url: /search?q
//!     headers: [accept, { x-api-key: "(\\w+)" }]
//!     action: search
//! ```
//!
//! `headers` is a header name, a map of name to value pattern, or a list of
//! those. Anything else is rejected with [`Error::InvalidHeader`].
//!
//! ## Environment Variables
//!
//! ### `ROUTECOMB_TRIM`, `ROUTECOMB_CASE`, `ROUTECOMB_DEBUG`
//!
//! Override the matching build option. `1`, `true`, `yes` and `on` (any case)
//! enable it; any other set value disables it. Unset variables leave the
//! option alone.

use std::env;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::router::{Router, RouterBuilder};
use crate::tree::{HeaderSpec, Options, Rule};

/// Build options as loaded from a file or the environment.
pub type RouterOptions = Options;

impl Options {
    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `ROUTECOMB_TRIM`, `ROUTECOMB_CASE` and `ROUTECOMB_DEBUG` where
    /// they are set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(trim) = env_flag("ROUTECOMB_TRIM") {
            self.trim = trim;
        }
        if let Some(case) = env_flag("ROUTECOMB_CASE") {
            self.case = case;
        }
        if let Some(debug) = env_flag("ROUTECOMB_DEBUG") {
            self.debug = debug;
        }
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| parse_flag(&v))
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// One rule as written in a rule file.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    /// Raw header declaration, validated by [`RuleEntry::rule`]
    #[serde(default)]
    pub headers: Option<Value>,
    pub action: String,
}

impl RuleEntry {
    /// Convert to a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] when `headers` has an unsupported
    /// shape.
    pub fn rule(&self) -> Result<Rule, Error> {
        Ok(Rule {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: match &self.headers {
                Some(value) => parse_headers(value)?,
                None => Vec::new(),
            },
        })
    }
}

/// A parsed rule file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleFile {
    pub options: Options,
    pub rules: Vec<RuleEntry>,
}

impl RuleFile {
    /// Register every entry, actions named as in the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] for a malformed header declaration.
    pub fn builder(&self) -> Result<RouterBuilder<String>, Error> {
        let mut builder = RouterBuilder::new();
        for entry in &self.rules {
            builder.on(entry.rule()?, entry.action.clone());
        }
        Ok(builder)
    }

    /// Build a router with the file's options.
    ///
    /// # Errors
    ///
    /// Any [`Error`] from header validation, parsing or merging.
    pub fn finalize(&self) -> Result<Router<String>, Error> {
        self.builder()?.finalize(&self.options)
    }
}

/// Read a rule file, picking the format from its extension.
///
/// # Errors
///
/// Fails if the file cannot be read or does not deserialize.
pub fn load_rules(path: &Path) -> anyhow::Result<RuleFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let file: RuleFile = match extension.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML rule file: {}", path.display()))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML rule file: {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON rule file: {}", path.display()))?,
    };
    Ok(file)
}

/// Turn a raw header declaration into header specs.
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] for numbers, booleans, nested lists and
/// map values that are not strings.
pub fn parse_headers(value: &Value) -> Result<Vec<HeaderSpec>, Error> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(parse_header).collect(),
        other => Ok(vec![parse_header(other)?]),
    }
}

fn parse_header(value: &Value) -> Result<HeaderSpec, Error> {
    match value {
        Value::String(name) => Ok(HeaderSpec::Name(name.clone())),
        Value::Object(map) => map
            .iter()
            .map(|(name, pattern)| match pattern {
                Value::String(pattern) => Ok((name.clone(), pattern.clone())),
                other => Err(invalid(&format!("{} for header `{}`", kind(other), name))),
            })
            .collect::<Result<Vec<_>, Error>>()
            .map(HeaderSpec::Pairs),
        other => Err(invalid(kind(other))),
    }
}

fn invalid(detail: &str) -> Error {
    Error::InvalidHeader {
        detail: detail.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_flag() {
        for on in ["1", "true", "YES", " on "] {
            assert!(parse_flag(on), "{}", on);
        }
        for off in ["0", "false", "no", ""] {
            assert!(!parse_flag(off), "{}", off);
        }
    }

    #[test]
    fn test_header_shapes() {
        assert_eq!(
            parse_headers(&json!("accept")).expect("string"),
            vec![HeaderSpec::Name("accept".to_string())]
        );
        assert_eq!(
            parse_headers(&json!({"host": "*", "accept": "(\\w+)"})).expect("map"),
            vec![HeaderSpec::Pairs(vec![
                ("host".to_string(), "*".to_string()),
                ("accept".to_string(), "(\\w+)".to_string())
            ])]
        );
        assert_eq!(
            parse_headers(&json!(["n", {"x": "*"}])).expect("list"),
            vec![
                HeaderSpec::Name("n".to_string()),
                HeaderSpec::Pairs(vec![("x".to_string(), "*".to_string())])
            ]
        );
        assert!(parse_headers(&Value::Null).expect("null").is_empty());
    }

    #[test]
    fn test_invalid_header_shapes() {
        for bad in [json!(42), json!(true), json!([["nested"]]), json!({"x": 1})] {
            let err = parse_headers(&bad).expect_err("rejected");
            assert!(matches!(err, Error::InvalidHeader { .. }), "{:?}", bad);
        }
        let err = parse_headers(&json!({"x": 1})).expect_err("number value");
        assert!(err.to_string().contains("a number for header `x`"));
    }

    #[test]
    fn test_rule_file_from_json() {
        let file: RuleFile = serde_json::from_value(json!({
            "options": {"trim": true},
            "rules": [
                {"url": "/a", "action": "a"},
                {"url": "/b/*", "method": "GET", "headers": "accept", "action": "b"}
            ]
        }))
        .expect("valid file");
        assert!(file.options.trim);
        assert!(!file.options.case);

        let router = file.finalize().expect("builds");
        assert_eq!(router.route("GET", "/a/").map(|m| m.action.as_str()), Some("a"));
        assert!(router.route("GET", "/b/1").is_none());
    }

    #[test]
    fn test_invalid_header_aborts_the_build() {
        let file: RuleFile = serde_json::from_value(json!({
            "rules": [{"url": "/", "headers": 5, "action": "x"}]
        }))
        .expect("deserializes");
        assert!(matches!(file.finalize(), Err(Error::InvalidHeader { .. })));
    }
}
