//! Recursive-descent parser for the pattern grammar.
//!
//! The grammar is a PEG: alternatives are tried in order and the first one
//! that matches wins. On failure the error points at the furthest column any
//! alternative reached, together with everything that would have been
//! accepted there.

use regex::Regex;

use super::classify::classify;
use super::{Atom, MatchForm, NodeKind, Pair, Pattern, RESERVED};
use crate::error::Error;

/// Grammar entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRule {
    /// `path ('?' pairs)? ('#' fragment)?`
    Route,
    /// `key ('=' value)?`
    Pair,
    Key,
    Value,
    Method,
}

/// Result of [`parse`], shaped by the start rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Route(Vec<NodeKind>),
    Pair(Pair),
    Pattern(Pattern),
}

/// Parse `input` starting from `rule`.
///
/// # Errors
///
/// Returns [`Error::Syntax`] with the 1-based column of the failure.
pub fn parse(input: &str, rule: StartRule) -> Result<Parsed, Error> {
    match rule {
        StartRule::Route => parse_route(input).map(Parsed::Route),
        StartRule::Pair => parse_pair(input).map(Parsed::Pair),
        StartRule::Key | StartRule::Value | StartRule::Method => {
            parse_unit(input).map(Parsed::Pattern)
        }
    }
}

/// Parse a full route pattern into its node kinds.
///
/// The list holds every path segment, the end-of-path marker, the query
/// pairs and the fragment, in that order.
///
/// # Errors
///
/// Returns [`Error::Syntax`] on malformed input.
pub fn parse_route(input: &str) -> Result<Vec<NodeKind>, Error> {
    let mut parser = Parser::new(input);
    let mut nodes = Vec::new();

    nodes.push(NodeKind::Segment(parser.segment()?));
    while parser.eat('/', "\"/\"") {
        nodes.push(NodeKind::Segment(parser.segment()?));
    }
    nodes.push(NodeKind::Segment(Pattern::null()));

    if parser.eat('?', "\"?\"") {
        nodes.push(NodeKind::Query(parser.pair()?));
        while parser.eat('&', "\"&\"") {
            nodes.push(NodeKind::Query(parser.pair()?));
        }
    }
    if parser.eat('#', "\"#\"") {
        nodes.push(NodeKind::Fragment(parser.unit()?));
    }

    parser.finish()?;
    Ok(nodes)
}

/// Parse `key` or `key=value`. A bare key gets the query default value.
///
/// # Errors
///
/// Returns [`Error::Syntax`] on malformed input.
pub fn parse_pair(input: &str) -> Result<Pair, Error> {
    let mut parser = Parser::new(input);
    let pair = parser.pair()?;
    parser.finish()?;
    Ok(pair)
}

/// Parse a key, value, fragment or method pattern. Globs are rejected.
///
/// # Errors
///
/// Returns [`Error::Syntax`] on malformed input.
pub fn parse_unit(input: &str) -> Result<Pattern, Error> {
    let mut parser = Parser::new(input);
    let pattern = parser.unit()?;
    parser.finish()?;
    Ok(pattern)
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    fail_pos: usize,
    expected: Vec<&'static str>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            fail_pos: 0,
            expected: Vec::new(),
        }
    }

    fn fail(&mut self, what: &'static str) {
        if self.pos < self.fail_pos {
            return;
        }
        if self.pos > self.fail_pos {
            self.fail_pos = self.pos;
            self.expected.clear();
        }
        self.expected.push(what);
    }

    fn eat(&mut self, c: char, what: &'static str) -> bool {
        if self.chars.get(self.pos) == Some(&c) {
            self.pos += 1;
            true
        } else {
            self.fail(what);
            false
        }
    }

    fn eat_str(&mut self, s: &str, what: &'static str) -> bool {
        let len = s.chars().count();
        let matches = self.pos + len <= self.chars.len()
            && self.chars[self.pos..self.pos + len].iter().copied().eq(s.chars());
        if matches {
            self.pos += len;
        } else {
            self.fail(what);
        }
        matches
    }

    fn eat_if(&mut self, accept: impl Fn(char) -> bool, what: &'static str) -> Option<char> {
        match self.chars.get(self.pos) {
            Some(&c) if accept(c) => {
                self.pos += 1;
                Some(c)
            }
            _ => {
                self.fail(what);
                None
            }
        }
    }

    fn any(&mut self) -> Option<char> {
        self.eat_if(|_| true, "any character")
    }

    /// `( '***' | '**' | '*' | regexp | absolute )*`
    fn segment(&mut self) -> Result<Pattern, Error> {
        self.atoms(true)
    }

    /// `( '**' | '*' | regexp | absolute )*`, used for keys, values,
    /// fragments and methods.
    fn unit(&mut self) -> Result<Pattern, Error> {
        self.atoms(false)
    }

    fn atoms(&mut self, glob_allowed: bool) -> Result<Pattern, Error> {
        let begin = self.pos;
        let mut atoms = Vec::new();

        loop {
            let start = self.pos;
            if glob_allowed {
                if self.eat_str("***", "\"***\"") {
                    return Err(self.error_at(start, "\"***\" is not a valid pattern"));
                }
                if self.eat_str("**", "\"**\"") {
                    atoms.push(Atom::Glob);
                    continue;
                }
            } else if self.eat_str("**", "\"**\"") {
                return Err(self.error_at(start, "glob patterns are only allowed in segments"));
            }
            if self.eat('*', "\"*\"") {
                atoms.push(Atom::Variable);
                continue;
            }
            if let Some(atom) = self.conditional() {
                atoms.push(atom);
                continue;
            }
            if let Some(text) = self.absolute() {
                atoms.push(Atom::Text(text));
                continue;
            }
            break;
        }

        let pattern = classify(&atoms);
        if let MatchForm::Regex(source) = &pattern.form {
            if let Err(err) = Regex::new(source) {
                return Err(self.error_at(begin, format!("invalid regular expression: {}", err)));
            }
        }
        Ok(pattern)
    }

    /// `'(' body ')' | '[' body ']'`
    fn conditional(&mut self) -> Option<Atom> {
        let start = self.pos;
        for (open, close, capturing) in [('(', ')', true), ('[', ']', false)] {
            let (open_desc, close_desc) = delimiters(open);
            if self.eat(open, open_desc) {
                let body = self.regex_body();
                if self.eat(close, close_desc) {
                    return Some(Atom::Conditional { body, capturing });
                }
            }
            self.pos = start;
        }
        None
    }

    /// Regex text with balanced brackets and parentheses. Escapes and
    /// nested groups are kept verbatim.
    fn regex_body(&mut self) -> String {
        let mut body = String::new();

        'outer: loop {
            let start = self.pos;
            if let Some(c) = self.eat_if(
                |c| !matches!(c, '[' | ']' | '(' | ')' | '\\'),
                "[^\\[\\]\\(\\)\\\\]",
            ) {
                body.push(c);
                continue;
            }
            if self.eat('\\', "\"\\\\\"") {
                if let Some(c) = self.any() {
                    body.push('\\');
                    body.push(c);
                    continue;
                }
                self.pos = start;
            }
            for (open, close) in [('[', ']'), ('(', ')')] {
                let (open_desc, close_desc) = delimiters(open);
                if self.eat(open, open_desc) {
                    let inner = self.regex_body();
                    if self.eat(close, close_desc) {
                        body.push(open);
                        body.push_str(&inner);
                        body.push(close);
                        continue 'outer;
                    }
                }
                self.pos = start;
            }
            break;
        }

        body
    }

    /// One or more unreserved or escaped characters.
    fn absolute(&mut self) -> Option<String> {
        let mut text = String::new();

        loop {
            let start = self.pos;
            if self.eat('\\', "\"\\\\\"") {
                if let Some(c) = self.any() {
                    text.push(c);
                    continue;
                }
                self.pos = start;
            }
            if let Some(c) = self.eat_if(|c| !RESERVED.contains(&c), "unreserved character") {
                text.push(c);
                continue;
            }
            break;
        }

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn pair(&mut self) -> Result<Pair, Error> {
        let key = self.unit()?;
        if self.eat('=', "\"=\"") {
            let value = self.unit()?;
            Ok(Pair::new(key, value))
        } else {
            Ok(Pair::bare_query(key))
        }
    }

    fn finish(&mut self) -> Result<(), Error> {
        if self.pos < self.chars.len() {
            self.fail("end of input");
            return Err(self.error());
        }
        Ok(())
    }

    fn error(&self) -> Error {
        let mut expected = self.expected.clone();
        expected.sort_unstable();
        expected.dedup();

        let listed = match expected.split_last() {
            None => String::from("nothing"),
            Some((last, [])) => (*last).to_string(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        };
        let found = match self.chars.get(self.fail_pos) {
            Some(c) => format!("{:?}", c.to_string()),
            None => String::from("end of input"),
        };

        Error::syntax(
            self.source,
            self.fail_pos + 1,
            format!("expected {} but {} found", listed, found),
        )
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> Error {
        Error::syntax(self.source, pos + 1, message)
    }
}

fn delimiters(open: char) -> (&'static str, &'static str) {
    if open == '(' {
        ("\"(\"", "\")\"")
    } else {
        ("\"[\"", "\"]\"")
    }
}
