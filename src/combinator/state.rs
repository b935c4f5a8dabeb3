//! Per-dispatch match state.

use std::sync::Arc;

use smallvec::SmallVec;

/// Maximum number of captures (and open pairs) kept inline before spilling
/// to the heap.
pub const MAX_INLINE_CAPTURES: usize = 8;

/// Captured values in the order their patterns were declared.
pub type Captures = SmallVec<[String; MAX_INLINE_CAPTURES]>;

type Open = SmallVec<[usize; MAX_INLINE_CAPTURES]>;

/// What is left of a request while a route is being matched.
///
/// Request data lives behind shared `Arc`s; a state only tracks what has
/// been consumed, so cloning it for every alternative stays cheap. Path
/// segments are consumed from the front, query and header pairs by removal,
/// the fragment and method at most once.
#[derive(Debug, Clone)]
pub struct State {
    path: Arc<[String]>,
    cursor: usize,
    queries: Arc<[(String, String)]>,
    open_queries: Open,
    headers: Arc<[(String, String)]>,
    open_headers: Open,
    fragment: Option<Arc<str>>,
    method: Option<Arc<str>>,
    saved: Captures,
}

impl State {
    /// Fresh state for one request.
    #[must_use]
    pub fn new(
        path: Vec<String>,
        queries: Vec<(String, String)>,
        fragment: Option<String>,
        method: Option<String>,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self {
            open_queries: (0..queries.len()).collect(),
            open_headers: (0..headers.len()).collect(),
            path: path.into(),
            cursor: 0,
            queries: queries.into(),
            headers: headers.into(),
            fragment: fragment.map(Arc::from),
            method: method.map(Arc::from),
            saved: Captures::new(),
        }
    }

    /// Path segments not yet consumed.
    #[must_use]
    pub fn remaining_path(&self) -> &[String] {
        &self.path[self.cursor.min(self.path.len())..]
    }

    /// Query pairs not yet consumed, in request order.
    pub fn remaining_queries(&self) -> impl Iterator<Item = &(String, String)> + '_ {
        self.open_queries.iter().map(|&i| &self.queries[i])
    }

    /// Header pairs not yet consumed, in request order.
    pub fn remaining_headers(&self) -> impl Iterator<Item = &(String, String)> + '_ {
        self.open_headers.iter().map(|&i| &self.headers[i])
    }

    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    #[must_use]
    pub fn captures(&self) -> &Captures {
        &self.saved
    }

    #[must_use]
    pub fn into_captures(self) -> Captures {
        self.saved
    }

    pub(crate) fn path_arc(&self) -> Arc<[String]> {
        Arc::clone(&self.path)
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.path.len());
    }

    pub(crate) fn save(&mut self, values: &[String]) {
        self.saved.extend(values.iter().cloned());
    }

    pub(crate) fn take_fragment(&mut self) -> Option<Arc<str>> {
        self.fragment.take()
    }

    pub(crate) fn take_method(&mut self) -> Option<Arc<str>> {
        self.method.take()
    }

    /// Shared pair storage plus the indices still open in it.
    pub(crate) fn pairs(&self, kind: PairKind) -> (Arc<[(String, String)]>, Open) {
        match kind {
            PairKind::Query => (Arc::clone(&self.queries), self.open_queries.clone()),
            PairKind::Header => (Arc::clone(&self.headers), self.open_headers.clone()),
        }
    }

    /// Drop the open pair at position `slot` of the open list.
    pub(crate) fn consume_pair(&mut self, kind: PairKind, slot: usize) {
        let open = match kind {
            PairKind::Query => &mut self.open_queries,
            PairKind::Header => &mut self.open_headers,
        };
        if slot < open.len() {
            open.remove(slot);
        }
    }
}

/// Which unordered pair collection a matcher reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairKind {
    Query,
    Header,
}
