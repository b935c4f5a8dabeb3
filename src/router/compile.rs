//! Tree to matcher compilation.

use regex::RegexBuilder;

use crate::combinator::{Captures, Predicate, Router, State};
use crate::error::Error;
use crate::pattern::{Class, MatchForm, NodeKind, Pattern};
use crate::tree::Branch;

/// Declaration index of the matched rule plus the state left after it.
pub type Outcome = (usize, State);

/// A compiled tree. Yields the declaration index of the winning rule.
pub type Matcher = Router<usize, Outcome>;

/// Compile sibling branches into one ordered alternation.
///
/// # Arguments
///
/// * `branches` - siblings, already in precedence order
/// * `case` - compile literals and regexes case-insensitively
/// * `trim` - let path ends also accept a single trailing empty segment
///
/// # Errors
///
/// Returns [`Error::Regex`] if a synthesized pattern regex does not compile.
pub fn compile(branches: &[Branch], case: bool, trim: bool) -> Result<Matcher, Error> {
    let alternatives = branches
        .iter()
        .map(|branch| compile_branch(branch, case, trim))
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(Router::choice(alternatives))
}

fn compile_branch(branch: &Branch, case: bool, trim: bool) -> Result<Matcher, Error> {
    let node = &branch.node;
    if node.kind == NodeKind::Handler {
        return Ok(Router::of(node.order));
    }

    let next = compile(&branch.children, case, trim)?;
    let matcher = match &node.kind {
        NodeKind::Segment(pattern) => match pattern.class() {
            Class::Null if trim => Router::trailing_slash().then(&Router::end()).then(&next),
            Class::Null => Router::end().then(&next),
            Class::Glob => Router::segments(predicate(pattern, case)?, &next),
            _ => Router::segment(predicate(pattern, case)?).then(&next),
        },
        NodeKind::Query(pair) => Router::query(
            predicate(pair.key(), case)?,
            predicate(pair.value(), case)?,
        )
        .then(&next),
        // Header names are case-insensitive regardless of options.
        NodeKind::Header(pair) => Router::header(
            predicate(pair.key(), true)?,
            predicate(pair.value(), case)?,
        )
        .then(&next),
        NodeKind::Fragment(pattern) => Router::fragment(predicate(pattern, case)?).then(&next),
        NodeKind::Method(pattern) => Router::method(predicate(pattern, case)?).then(&next),
        NodeKind::Handler => Router::of(node.order),
    };
    Ok(matcher)
}

/// Predicate for one pattern. Only regex forms capture.
fn predicate(pattern: &Pattern, case: bool) -> Result<Predicate<Captures, Outcome>, Error> {
    let predicate = match pattern.form() {
        MatchForm::Null => Predicate::satisfy(|_| false).map(|_| Captures::new()),
        MatchForm::Exact(text) => Predicate::exact(text, case).map(|_| Captures::new()),
        MatchForm::Regex(source) => {
            let regex = RegexBuilder::new(source)
                .case_insensitive(case)
                .build()
                .map_err(|e| Error::Regex {
                    pattern: source.clone(),
                    reason: e.to_string(),
                })?;
            Predicate::matches(regex).save()
        }
    };
    Ok(predicate)
}
