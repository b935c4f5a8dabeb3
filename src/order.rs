//! # Ordering Module
//!
//! Precedence between route tails. Routes are compared node by node; at each
//! position the leading nodes are ranked by:
//!
//! 1. dimension (segment, query, fragment, method, header, handler),
//! 2. for query and header pairs, how many pairs of that dimension the tail
//!    still carries (more constraints first),
//! 3. classification (null, absolute, conditional, variable, glob),
//! 4. literal text for absolute patterns,
//! 5. declaration index, then source text, for patterns that can overlap.
//!
//! Every step is a plain key comparison, so the whole thing is a
//! lexicographic order and therefore a strict weak ordering. Grouping of
//! textually identical patterns is done separately by [`equivalent`], which
//! ignores declaration order.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::pattern::{Class, Node, NodeKind, Pair, Pattern};

/// Compare the leading nodes of two tails.
///
/// Empty tails sort after non-empty ones; two empty tails are equal.
#[must_use]
pub fn compare_lead(a: &[Node], b: &[Node]) -> Ordering {
    let (lead_a, lead_b) = match (a.first(), b.first()) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(x), Some(y)) => (x, y),
    };

    lead_a
        .dimension()
        .cmp(&lead_b.dimension())
        .then_with(|| match (&lead_a.kind, &lead_b.kind) {
            (NodeKind::Segment(x), NodeKind::Segment(y))
            | (NodeKind::Fragment(x), NodeKind::Fragment(y))
            | (NodeKind::Method(x), NodeKind::Method(y)) => {
                compare_patterns(x, lead_a.order, y, lead_b.order)
            }
            (NodeKind::Query(x), NodeKind::Query(y)) => same_dimension_count(b)
                .cmp(&same_dimension_count(a))
                .then_with(|| compare_pairs(x, lead_a.order, y, lead_b.order, false)),
            (NodeKind::Header(x), NodeKind::Header(y)) => same_dimension_count(b)
                .cmp(&same_dimension_count(a))
                .then_with(|| compare_pairs(x, lead_a.order, y, lead_b.order, true)),
            _ => Ordering::Equal,
        })
}

/// Compare two whole tails position by position.
///
/// The first differing position decides. When one tail is a strict prefix
/// of the other, the longer one sorts first.
#[must_use]
pub fn compare_routes(a: &[Node], b: &[Node]) -> Ordering {
    let mut i = 0;
    loop {
        let ord = compare_lead(&a[i.min(a.len())..], &b[i.min(b.len())..]);
        if ord != Ordering::Equal || (i >= a.len() && i >= b.len()) {
            return ord;
        }
        i += 1;
    }
}

/// True when the leading nodes of both tails can share one tree node.
///
/// Same dimension, same classification and same source text on every
/// pattern involved. Header names compare without case, as they match.
/// Pairs additionally need the same number of remaining pairs of their
/// dimension. Declaration order is ignored.
#[must_use]
pub fn equivalent(a: &[Node], b: &[Node]) -> bool {
    let (Some(lead_a), Some(lead_b)) = (a.first(), b.first()) else {
        return a.is_empty() && b.is_empty();
    };
    match (&lead_a.kind, &lead_b.kind) {
        (NodeKind::Segment(x), NodeKind::Segment(y))
        | (NodeKind::Fragment(x), NodeKind::Fragment(y))
        | (NodeKind::Method(x), NodeKind::Method(y)) => x.same_as(y),
        (NodeKind::Query(x), NodeKind::Query(y)) => {
            x.key.same_as(&y.key)
                && x.value.same_as(&y.value)
                && same_dimension_count(a) == same_dimension_count(b)
        }
        (NodeKind::Header(x), NodeKind::Header(y)) => {
            x.key.same_folded(&y.key)
                && x.value.same_as(&y.value)
                && same_dimension_count(a) == same_dimension_count(b)
        }
        (NodeKind::Handler, NodeKind::Handler) => true,
        _ => false,
    }
}

/// Lead-node identity after lower-casing all source text.
///
/// Pair counts are not considered.
#[must_use]
pub fn equivalent_folded(a: &Node, b: &Node) -> bool {
    match (&a.kind, &b.kind) {
        (NodeKind::Segment(x), NodeKind::Segment(y))
        | (NodeKind::Fragment(x), NodeKind::Fragment(y))
        | (NodeKind::Method(x), NodeKind::Method(y)) => x.same_folded(y),
        (NodeKind::Query(x), NodeKind::Query(y)) | (NodeKind::Header(x), NodeKind::Header(y)) => {
            x.key.same_folded(&y.key) && x.value.same_folded(&y.value)
        }
        (NodeKind::Handler, NodeKind::Handler) => true,
        _ => false,
    }
}

fn same_dimension_count(tail: &[Node]) -> usize {
    match tail.first() {
        Some(lead) => {
            let dimension = lead.dimension();
            tail.iter().filter(|n| n.dimension() == dimension).count()
        }
        None => 0,
    }
}

fn compare_patterns(a: &Pattern, order_a: usize, b: &Pattern, order_b: usize) -> Ordering {
    a.class.cmp(&b.class).then_with(|| match a.class {
        Class::Null => Ordering::Equal,
        Class::Absolute => a.original.cmp(&b.original),
        _ => order_a.cmp(&order_b).then_with(|| a.original.cmp(&b.original)),
    })
}

/// Source text of a key, lower-cased when `fold` is set.
fn key_text(p: &Pattern, fold: bool) -> Cow<'_, str> {
    if fold {
        Cow::Owned(p.original.to_lowercase())
    } else {
        Cow::Borrowed(p.original.as_str())
    }
}

fn compare_pairs(a: &Pair, order_a: usize, b: &Pair, order_b: usize, fold_keys: bool) -> Ordering {
    fn literal(p: &Pattern) -> Option<&str> {
        (p.class == Class::Absolute).then_some(p.original.as_str())
    }
    fn key_literal(p: &Pattern, fold: bool) -> Option<Cow<'_, str>> {
        (p.class == Class::Absolute).then(|| key_text(p, fold))
    }

    a.key
        .class
        .cmp(&b.key.class)
        .then_with(|| key_literal(&a.key, fold_keys).cmp(&key_literal(&b.key, fold_keys)))
        .then_with(|| a.value.class.cmp(&b.value.class))
        .then_with(|| literal(&a.value).cmp(&literal(&b.value)))
        .then_with(|| {
            let overlapping =
                a.key.class >= Class::Conditional || a.value.class >= Class::Conditional;
            if !overlapping {
                return Ordering::Equal;
            }
            order_a
                .cmp(&order_b)
                .then_with(|| key_text(&a.key, fold_keys).cmp(&key_text(&b.key, fold_keys)))
                .then_with(|| a.value.original.cmp(&b.value.original))
        })
}
