//! Human-readable rendering of a merged route.

use std::fmt;

use serde::Serialize;

use crate::pattern::{Class, Node, NodeKind, Pair};

use super::ANY_METHOD;

/// One root-to-leaf route of a merged tree, in source form.
///
/// Displays as `METHOD path?key=value#fragment {header: value}`, with `ALL`
/// standing in for the default method and bare pair keys shown without a
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTrace {
    /// Declaration index of the rule this route came from
    pub action: usize,
    pub segments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<(String, Option<String>)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, Option<String>)>,
}

impl RouteTrace {
    /// Collect the source text of every node of one route.
    #[must_use]
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut trace = RouteTrace::default();
        for node in nodes {
            trace.action = node.order;
            match &node.kind {
                NodeKind::Segment(p) if p.class() == Class::Null => {}
                NodeKind::Segment(p) => trace.segments.push(p.original().to_string()),
                NodeKind::Query(pair) => trace.queries.push(pair_text(pair)),
                NodeKind::Fragment(p) => trace.fragment = Some(p.original().to_string()),
                NodeKind::Method(p) => trace.method = Some(p.original().to_string()),
                NodeKind::Header(pair) => trace.headers.push(pair_text(pair)),
                NodeKind::Handler => {}
            }
        }
        trace
    }

    /// The path part alone, e.g. `/users/*`.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

fn pair_text(pair: &Pair) -> (String, Option<String>) {
    let value = if pair.implicit_value() {
        None
    } else {
        Some(pair.value().original().to_string())
    };
    (pair.key().original().to_string(), value)
}

impl fmt::Display for RouteTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(method) = &self.method {
            let method = if method == ANY_METHOD { "ALL" } else { method };
            write!(f, "{} ", method)?;
        }
        f.write_str(&self.path())?;

        for (i, (key, value)) in self.queries.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            f.write_str(key)?;
            if let Some(value) = value {
                write!(f, "={}", value)?;
            }
        }

        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }

        if !self.headers.is_empty() {
            f.write_str(" {")?;
            for (i, (key, value)) in self.headers.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(key)?;
                if let Some(value) = value {
                    write!(f, ": {}", value)?;
                }
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}
