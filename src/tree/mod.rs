//! # Tree Module
//!
//! Merges independently declared rules into one decision tree.
//!
//! ## Overview
//!
//! Each [`Rule`] is parsed into a flat list of nodes:
//!
//! ```text
//! segments.. <end> queries.. fragment? method headers.. handler
//! ```
//!
//! Rules whose leading nodes are identical share a [`Branch`]; their tails
//! become that branch's children and are merged the same way. Sibling
//! branches are sorted with [`crate::order::compare_lead`], which is the
//! order the matcher later tries them in.
//!
//! ## Conflicts
//!
//! - Two rules identical on every node fail with
//!   [`Error::DuplicateRoute`]. Query and header pairs count as a bag here,
//!   so `/x?a&b` duplicates `/x?b&a`.
//! - With [`Options::case`], two rules whose nodes differ only in letter case
//!   fail with [`Error::CaseConflict`].

mod trace;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::slice;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Error;
use crate::order::{compare_lead, equivalent, equivalent_folded};
use crate::pattern::{parse_route, parse_unit, Class, Dimension, Node, NodeKind, Pair};

pub use trace::RouteTrace;

/// Method pattern used when a rule does not name one.
pub const ANY_METHOD: &str = "[.*]";

/// Header constraint as declared on a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSpec {
    /// Header must be present; its value is captured.
    Name(String),
    /// `name: value` patterns, every one required.
    Pairs(Vec<(String, String)>),
}

/// One user-declared rule, without its action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub url: String,
    /// `None` matches any method
    pub method: Option<String>,
    pub headers: Vec<HeaderSpec>,
}

impl Rule {
    /// A rule matching `url` with any method.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Require a header to be present and capture its value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.headers.push(HeaderSpec::Name(name.into()));
        self
    }

    /// Require a header whose value matches `value`.
    #[must_use]
    pub fn header_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .push(HeaderSpec::Pairs(vec![(name.into(), value.into())]));
        self
    }
}

/// Receives the trace of every merged route once a build succeeds.
pub type TraceSink = Arc<dyn Fn(&[RouteTrace]) + Send + Sync>;

/// Build options.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    /// A rule for `/a` also matches `/a/`, and the other way round.
    pub trim: bool,
    /// Case-insensitive matching plus case-conflict detection.
    pub case: bool,
    /// Log every merged route at info level.
    pub debug: bool,
    #[serde(skip)]
    pub trace_sink: Option<TraceSink>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("trim", &self.trim)
            .field("case", &self.case)
            .field("debug", &self.debug)
            .field("trace_sink", &self.trace_sink.is_some())
            .finish()
    }
}

/// A node and the branches that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub node: Node,
    pub children: Vec<Branch>,
}

/// The merged decision tree.
#[derive(Debug, Clone)]
pub struct Tree {
    roots: Vec<Branch>,
    routes: Vec<Vec<Node>>,
}

impl Tree {
    /// Top-level branches in match order.
    #[must_use]
    pub fn roots(&self) -> &[Branch] {
        &self.roots
    }

    /// Number of rules merged into the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every route in the order the matcher tries them.
    #[must_use]
    pub fn traces(&self) -> Vec<RouteTrace> {
        let mut leaves = Vec::with_capacity(self.routes.len());
        collect_leaves(&self.roots, &mut leaves);
        leaves
            .into_iter()
            .filter_map(|order| self.routes.get(order))
            .map(|nodes| RouteTrace::from_nodes(nodes))
            .collect()
    }
}

fn collect_leaves(branches: &[Branch], out: &mut Vec<usize>) {
    for branch in branches {
        if branch.node.kind == NodeKind::Handler {
            out.push(branch.node.order);
        }
        collect_leaves(&branch.children, out);
    }
}

/// Parse and merge `rules` into one tree.
///
/// The declaration index of each rule is its position in `rules`; handler
/// leaves carry it so callers can map a match back to their action.
///
/// # Errors
///
/// - [`Error::Syntax`] for a malformed url, method or header pattern
/// - [`Error::DuplicateRoute`] for two identical rules
/// - [`Error::CaseConflict`] for rules differing only in case when
///   `options.case` is set
pub fn build(rules: &[Rule], options: &Options) -> Result<Tree, Error> {
    let routes = rules
        .iter()
        .enumerate()
        .map(|(order, rule)| to_nodes(rule, order, options.trim))
        .collect::<Result<Vec<_>, Error>>()?;

    reject_reordered_duplicates(&routes)?;

    let tails: Vec<&[Node]> = routes.iter().map(Vec::as_slice).collect();
    let roots = merge(tails, &routes, options)?;
    let tree = Tree { roots, routes };

    debug!(
        rules_count = rules.len(),
        roots_count = tree.roots.len(),
        trim = options.trim,
        case = options.case,
        "Route tree merged"
    );

    if options.debug || options.trace_sink.is_some() {
        let traces = tree.traces();
        if options.debug {
            for trace in &traces {
                info!(route = %trace, action = trace.action, "Merged route");
            }
        }
        if let Some(sink) = &options.trace_sink {
            sink(&traces);
        }
    }

    Ok(tree)
}

/// Flatten one rule into its node list.
fn to_nodes(rule: &Rule, order: usize, trim: bool) -> Result<Vec<Node>, Error> {
    let mut kinds = parse_route(&rule.url)?;
    kinds.push(NodeKind::Method(parse_unit(
        rule.method.as_deref().unwrap_or(ANY_METHOD),
    )?));

    for spec in &rule.headers {
        match spec {
            HeaderSpec::Name(name) => {
                kinds.push(NodeKind::Header(Pair::bare_header(parse_unit(name)?)));
            }
            HeaderSpec::Pairs(pairs) => {
                for (name, value) in pairs {
                    let pair = Pair::new(parse_unit(name)?, parse_unit(value)?);
                    kinds.push(NodeKind::Header(pair));
                }
            }
        }
    }
    kinds.push(NodeKind::Handler);

    if trim {
        trim_trailing_slash(&mut kinds);
    }

    Ok(kinds.into_iter().map(|kind| Node::new(kind, order)).collect())
}

/// Drop the empty segment a trailing `/` leaves before the end marker, so
/// `/a/` and `/a` produce the same nodes, and `/` the same as the empty url.
fn trim_trailing_slash(kinds: &mut Vec<NodeKind>) {
    let Some(end) = kinds.iter().position(NodeKind::is_path_end) else {
        return;
    };
    let empty_before_end = end > 1
        && matches!(
            &kinds[end - 1],
            NodeKind::Segment(p) if p.class() == Class::Absolute && p.original().is_empty()
        );
    if empty_before_end {
        kinds.remove(end - 1);
    }
}

/// Identity of a route with its query and header pairs taken as a bag.
#[derive(PartialEq, Eq, Hash)]
struct BagKey {
    nodes: Vec<(Dimension, Class, String)>,
    queries: Vec<PairKey>,
    headers: Vec<PairKey>,
}

type PairKey = (Class, String, Class, String);

impl BagKey {
    fn of(nodes: &[Node]) -> Self {
        let mut key = BagKey {
            nodes: Vec::new(),
            queries: Vec::new(),
            headers: Vec::new(),
        };
        for node in nodes {
            match &node.kind {
                NodeKind::Query(pair) => key.queries.push(pair_key(pair, false)),
                // header names match without case
                NodeKind::Header(pair) => key.headers.push(pair_key(pair, true)),
                kind => {
                    let (class, text) = kind
                        .pattern()
                        .map_or((Class::Null, String::new()), |p| {
                            (p.class(), p.original().to_string())
                        });
                    key.nodes.push((kind.dimension(), class, text));
                }
            }
        }
        key.queries.sort();
        key.headers.sort();
        key
    }
}

fn pair_key(pair: &Pair, fold_key: bool) -> PairKey {
    let key = pair.key().original();
    (
        pair.key().class(),
        if fold_key {
            key.to_lowercase()
        } else {
            key.to_string()
        },
        pair.value().class(),
        pair.value().original().to_string(),
    )
}

/// Fail on two rules that differ only in the order of their pairs. Both
/// accept the same requests, so the later one could never win.
fn reject_reordered_duplicates(routes: &[Vec<Node>]) -> Result<(), Error> {
    let mut seen: HashMap<BagKey, usize> = HashMap::with_capacity(routes.len());
    for (order, nodes) in routes.iter().enumerate() {
        match seen.entry(BagKey::of(nodes)) {
            Entry::Occupied(earlier) => {
                return Err(Error::DuplicateRoute {
                    route: render(routes, *earlier.get()),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(order);
            }
        }
    }
    Ok(())
}

struct Group<'a> {
    /// Tail of the earliest-declared route in the group
    first: &'a [Node],
    children: Vec<&'a [Node]>,
}

/// Group tails by leading node, sort the groups and recurse into them.
///
/// `tails` must be in declaration order, so the first tail of every group
/// is its earliest rule.
fn merge<'a>(
    tails: Vec<&'a [Node]>,
    routes: &[Vec<Node>],
    options: &Options,
) -> Result<Vec<Branch>, Error> {
    let mut groups: Vec<Group<'a>> = Vec::new();

    for tail in tails {
        let Some(lead) = tail.first() else {
            continue;
        };

        if let Some(group) = groups.iter_mut().find(|g| equivalent(g.first, tail)) {
            if tail.len() == 1 {
                return Err(Error::DuplicateRoute {
                    route: render(routes, group.first[0].order),
                });
            }
            group.children.push(&tail[1..]);
            continue;
        }

        if options.case {
            let conflict = groups.iter().find(|g| {
                let other = &g.first[0];
                equivalent_folded(other, lead)
                    && !equivalent(slice::from_ref(other), slice::from_ref(lead))
            });
            if let Some(group) = conflict {
                return Err(Error::CaseConflict {
                    route: render(routes, lead.order),
                    existing: render(routes, group.first[0].order),
                });
            }
        }

        groups.push(Group {
            first: tail,
            children: if tail.len() > 1 {
                vec![&tail[1..]]
            } else {
                Vec::new()
            },
        });
    }

    groups.sort_by(|a, b| compare_lead(a.first, b.first));

    groups
        .into_iter()
        .map(|group| {
            Ok(Branch {
                node: group.first[0].clone(),
                children: merge(group.children, routes, options)?,
            })
        })
        .collect()
}

fn render(routes: &[Vec<Node>], order: usize) -> String {
    routes
        .get(order)
        .map(|nodes| RouteTrace::from_nodes(nodes).to_string())
        .unwrap_or_default()
}
