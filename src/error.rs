//! Build-time errors.
//!
//! Everything here is raised while a rule set is being parsed, merged or
//! compiled. A request that matches nothing is not an error: dispatch returns
//! `None` for that case.

use std::fmt;

/// Error raised while building a router from a rule set.
///
/// All variants abort the whole build; no partial router is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A pattern string does not follow the pattern grammar.
    Syntax {
        /// Full source text of the offending pattern
        pattern: String,
        /// 1-based column of the furthest position the parser could reach
        column: usize,
        /// Human-readable expectation, e.g. `expected "/" but ")" found`
        message: String,
    },
    /// Two rules are indistinguishable on every dimension.
    DuplicateRoute {
        /// Display form of the rule that was declared twice
        route: String,
    },
    /// With case-insensitive matching, two rules differ only in letter case.
    CaseConflict {
        /// Display form of the rule being merged
        route: String,
        /// Display form of the rule it collides with
        existing: String,
    },
    /// A header declaration is neither a string, a map, nor a list of those.
    InvalidHeader {
        /// What was found instead
        detail: String,
    },
    /// A synthesized pattern regex was rejected by the regex engine.
    Regex {
        /// Regex source that failed to compile
        pattern: String,
        /// Engine diagnostic
        reason: String,
    },
}

impl Error {
    /// Wrap a parse failure with the pattern it came from.
    pub(crate) fn syntax(pattern: &str, column: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            pattern: pattern.to_string(),
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax {
                pattern,
                column,
                message,
            } => {
                write!(
                    f,
                    "in URL pattern `{}` at column {}, {}",
                    pattern, column, message
                )
            }
            Error::DuplicateRoute { route } => write!(f, "duplicate route `{}`", route),
            Error::CaseConflict { route, existing } => {
                write!(f, "case conflict `{}` vs `{}`", route, existing)
            }
            Error::InvalidHeader { detail } => {
                write!(
                    f,
                    "header must be a string, a map or a list of those, found {}",
                    detail
                )
            }
            Error::Regex { pattern, reason } => {
                write!(f, "invalid pattern regex `{}`: {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display_names_pattern_and_column() {
        let err = Error::syntax("test)", 5, "expected \"/\" but \")\" found");
        assert_eq!(
            err.to_string(),
            "in URL pattern `test)` at column 5, expected \"/\" but \")\" found"
        );
    }

    #[test]
    fn test_case_conflict_display() {
        let err = Error::CaseConflict {
            route: "GET /A".to_string(),
            existing: "GET /a".to_string(),
        };
        assert_eq!(err.to_string(), "case conflict `GET /A` vs `GET /a`");
    }
}
