//! Atom lists to [`Pattern`] values.

use super::{Atom, Class, MatchForm, Pattern, RESERVED};

/// Regex fragment for `*`: one segment, key, value or token.
const VARIABLE_REGEX: &str = "([^/]*)";
/// Regex fragment for `**`: any remainder, `/` included.
const GLOB_REGEX: &str = "(.*)";

/// Escape literal text for inclusion in a synthesized regex.
///
/// ASCII letters, digits and `-` pass through; everything else becomes a
/// `\x{HEX}` code point escape so no character can act as a metacharacter.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else {
            out.push_str(&format!("\\x{{{:X}}}", u32::from(c)));
        }
    }
    out
}

/// Put back the backslashes the parser removed from literal text.
pub(crate) fn escape_reserved(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Combine atoms into a single pattern.
///
/// Classification is the most permissive atom kind present. Pure literal
/// input (including no atoms at all) stays an exact string match.
pub(crate) fn classify(atoms: &[Atom]) -> Pattern {
    let class = atoms
        .iter()
        .map(|atom| match atom {
            Atom::Text(_) => Class::Absolute,
            Atom::Conditional { .. } => Class::Conditional,
            Atom::Variable => Class::Variable,
            Atom::Glob => Class::Glob,
        })
        .max()
        .unwrap_or(Class::Absolute);

    let mut original = String::new();
    for atom in atoms {
        match atom {
            Atom::Text(text) => original.push_str(&escape_reserved(text)),
            Atom::Conditional { body, capturing } => {
                let (open, close) = if *capturing { ('(', ')') } else { ('[', ']') };
                original.push(open);
                original.push_str(body);
                original.push(close);
            }
            Atom::Variable => original.push('*'),
            Atom::Glob => original.push_str("**"),
        }
    }

    if class == Class::Absolute {
        let text: String = atoms
            .iter()
            .filter_map(|atom| match atom {
                Atom::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        return Pattern {
            class,
            original,
            form: MatchForm::Exact(text),
        };
    }

    let mut regex = String::from("^(?:");
    for atom in atoms {
        match atom {
            Atom::Text(text) => regex.push_str(&escape(text)),
            Atom::Conditional {
                body,
                capturing: true,
            } => {
                regex.push('(');
                regex.push_str(body);
                regex.push(')');
            }
            Atom::Conditional {
                body,
                capturing: false,
            } => {
                regex.push_str("(?:");
                regex.push_str(body);
                regex.push(')');
            }
            Atom::Variable => regex.push_str(VARIABLE_REGEX),
            Atom::Glob => regex.push_str(GLOB_REGEX),
        }
    }
    regex.push_str(")$");

    Pattern {
        class,
        original,
        form: MatchForm::Regex(regex),
    }
}
