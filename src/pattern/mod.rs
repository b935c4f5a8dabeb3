//! # Pattern Module
//!
//! Turns compact pattern strings into typed [`Pattern`] values and flat
//! route node lists.
//!
//! ## Syntax
//!
//! | Atom     | Example  | Meaning                                        |
//! |----------|----------|------------------------------------------------|
//! | literal  | `users`  | exact text, `\x` escapes a reserved character  |
//! | `(re)`   | `(\d+)`  | regex fragment, adds a capture group           |
//! | `[re]`   | `[a\|b]` | regex fragment, brackets add no capture group  |
//! | `*`      | `*.js`   | one whole segment, key, value or token         |
//! | `**`     | `/a/**`  | zero or more path segments (segments only)     |
//!
//! Reserved characters are `/ [ ] ( ) * ? = & # \`. A route pattern is
//! `path ('?' pair ('&' pair)*)? ('#' fragment)?` where a pair is
//! `key ('=' value)?`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use routecomb::pattern::{parse_route, NodeKind};
//!
//! let nodes = parse_route("/users/(\\d+)?expand")?;
//! // ["", "users", (\d+), <end>, expand=([^/]*)]
//! assert_eq!(nodes.len(), 5);
//! ```

mod classify;
mod parser;
#[cfg(test)]
mod tests;

use std::fmt;

pub use classify::escape;
pub use parser::{parse, parse_pair, parse_route, parse_unit, Parsed, StartRule};

/// Characters that need a `\` to appear in literal text.
pub(crate) const RESERVED: &[char] = &['/', '[', ']', '(', ')', '*', '?', '=', '&', '#', '\\'];

/// Specificity tier of a pattern, least to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Class {
    /// Synthetic end-of-path marker
    Null,
    /// Literal text only
    Absolute,
    /// Contains a regex fragment but no wildcard
    Conditional,
    /// Contains `*`
    Variable,
    /// Contains `**`
    Glob,
}

/// How a pattern is tested against an input value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchForm {
    /// Matches only the absence of a value
    Null,
    /// Exact string comparison
    Exact(String),
    /// Anchored regex source
    Regex(String),
}

/// One lexical unit of a pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// Literal text with escapes resolved
    Text(String),
    /// Regex fragment; `capturing` is true for `(…)` and false for `[…]`
    Conditional { body: String, capturing: bool },
    /// `*`
    Variable,
    /// `**`
    Glob,
}

/// A compiled segment, key, value, fragment or method pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub(crate) class: Class,
    pub(crate) original: String,
    pub(crate) form: MatchForm,
}

impl Pattern {
    /// The synthetic end-of-path pattern appended to every parsed path.
    #[must_use]
    pub fn null() -> Self {
        Self {
            class: Class::Null,
            original: String::new(),
            form: MatchForm::Null,
        }
    }

    /// A literal pattern for `text`.
    #[must_use]
    pub fn absolute(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            class: Class::Absolute,
            original: classify::escape_reserved(&text),
            form: MatchForm::Exact(text),
        }
    }

    /// Build a pattern directly from its atoms.
    #[must_use]
    pub fn from_atoms(atoms: &[Atom]) -> Self {
        classify::classify(atoms)
    }

    #[must_use]
    pub fn class(&self) -> Class {
        self.class
    }

    /// Source text as written, escapes included. Used for display, case
    /// folding and identity.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn form(&self) -> &MatchForm {
        &self.form
    }

    /// Same class and same source text. Two identical patterns are
    /// interchangeable when merging rules.
    #[must_use]
    pub fn same_as(&self, other: &Pattern) -> bool {
        self.class == other.class && self.original == other.original
    }

    /// Identity after lower-casing the source text.
    #[must_use]
    pub fn same_folded(&self, other: &Pattern) -> bool {
        self.class == other.class && self.original.to_lowercase() == other.original.to_lowercase()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// A query or header constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub(crate) key: Pattern,
    pub(crate) value: Pattern,
    /// The value was not written and defaults to "capture anything".
    pub(crate) implicit_value: bool,
}

impl Pair {
    #[must_use]
    pub fn new(key: Pattern, value: Pattern) -> Self {
        Self {
            key,
            value,
            implicit_value: false,
        }
    }

    /// A bare query key: the value captures any text without `/`.
    #[must_use]
    pub fn bare_query(key: Pattern) -> Self {
        Self {
            key,
            value: Pattern {
                class: Class::Variable,
                original: "*".to_string(),
                form: MatchForm::Regex("^([^/]*)$".to_string()),
            },
            implicit_value: true,
        }
    }

    /// A bare header name: the value captures any text.
    #[must_use]
    pub fn bare_header(key: Pattern) -> Self {
        Self {
            key,
            value: Pattern {
                class: Class::Variable,
                original: "*".to_string(),
                form: MatchForm::Regex("^(.*)$".to_string()),
            },
            implicit_value: true,
        }
    }

    #[must_use]
    pub fn key(&self) -> &Pattern {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &Pattern {
        &self.value
    }

    #[must_use]
    pub fn implicit_value(&self) -> bool {
        self.implicit_value
    }
}

/// Request facet a node constrains, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Segment,
    Query,
    Fragment,
    Method,
    Header,
    Handler,
}

/// What a route node matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Segment(Pattern),
    Query(Pair),
    Fragment(Pattern),
    Method(Pattern),
    Header(Pair),
    /// Terminal marker; the action itself lives in the router
    Handler,
}

impl NodeKind {
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        match self {
            NodeKind::Segment(_) => Dimension::Segment,
            NodeKind::Query(_) => Dimension::Query,
            NodeKind::Fragment(_) => Dimension::Fragment,
            NodeKind::Method(_) => Dimension::Method,
            NodeKind::Header(_) => Dimension::Header,
            NodeKind::Handler => Dimension::Handler,
        }
    }

    /// The single pattern of a segment, fragment or method node.
    #[must_use]
    pub fn pattern(&self) -> Option<&Pattern> {
        match self {
            NodeKind::Segment(p) | NodeKind::Fragment(p) | NodeKind::Method(p) => Some(p),
            _ => None,
        }
    }

    /// The pair of a query or header node.
    #[must_use]
    pub fn pair(&self) -> Option<&Pair> {
        match self {
            NodeKind::Query(p) | NodeKind::Header(p) => Some(p),
            _ => None,
        }
    }

    /// True for the synthetic end-of-path segment.
    #[must_use]
    pub fn is_path_end(&self) -> bool {
        matches!(self, NodeKind::Segment(p) if p.class == Class::Null)
    }
}

/// A route node tagged with the declaration index of its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub order: usize,
}

impl Node {
    #[must_use]
    pub fn new(kind: NodeKind, order: usize) -> Self {
        Self { kind, order }
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.kind.dimension()
    }
}
