//! # Combinator Module
//!
//! A small continuation-passing matcher algebra over [`State`].
//!
//! ## Shape
//!
//! A [`Router<T, R>`] is a function of a state and a success continuation.
//! On success it calls the continuation with the value it matched and the
//! state that is left; the continuation returns `Some(R)` to accept the
//! whole match or `None` to reject it. Returning `None` is the failure
//! continuation: the nearest enclosing [`Router::choice`] then tries its next
//! alternative on a fresh clone of the state it started from. Failure
//! therefore backtracks through every decision point, including ones that
//! already succeeded locally, and never allocates.
//!
//! A [`Predicate<T, R>`] is a router parameterised by one input string, used
//! to test a single segment, key, value, fragment or method.
//!
//! ## Example
//!
//! ```rust,ignore
//! use routecomb::combinator::{Predicate, Router, State};
//!
//! let r = Router::segment(Predicate::exact("", false))
//!     .then(&Router::segment(Predicate::matches(regex).save()))
//!     .then(&Router::end())
//!     .then(&Router::of("item"));
//! let state = State::new(vec!["".into(), "42".into()], vec![], None, None, vec![]);
//! let (action, rest) = r.evaluate(state).unwrap();
//! ```

mod state;

use std::sync::Arc;

use regex::Regex;

pub use state::{Captures, State, MAX_INLINE_CAPTURES};
use state::PairKind;

type Run<T, R> = dyn Fn(State, &dyn Fn(T, State) -> Option<R>) -> Option<R> + Send + Sync;
type Test<T, R> = dyn Fn(&str, State, &dyn Fn(T, State) -> Option<R>) -> Option<R> + Send + Sync;

/// A backtracking matcher yielding `T` to a continuation that produces `R`.
pub struct Router<T, R> {
    run: Arc<Run<T, R>>,
}

impl<T, R> Clone for Router<T, R> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T: 'static, R: 'static> Router<T, R> {
    /// Wrap a raw continuation-passing function.
    pub fn new(
        run: impl Fn(State, &dyn Fn(T, State) -> Option<R>) -> Option<R> + Send + Sync + 'static,
    ) -> Self {
        Self { run: Arc::new(run) }
    }

    /// Run against `state`, handing each success to `ok`.
    pub fn run(&self, state: State, ok: &dyn Fn(T, State) -> Option<R>) -> Option<R> {
        (self.run)(state, ok)
    }

    /// Always succeeds with `value`, consuming nothing.
    #[must_use]
    pub fn of(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Router::new(move |s, ok| ok(value.clone(), s))
    }

    /// Always fails.
    #[must_use]
    pub fn empty() -> Self {
        Router::new(|_, _| None)
    }

    /// Try `self`; if it or anything after it fails, try `other` on the
    /// original state.
    #[must_use]
    pub fn concat(&self, other: &Router<T, R>) -> Self {
        let (first, second) = (self.clone(), other.clone());
        Router::new(move |s, ok| first.run(s.clone(), ok).or_else(|| second.run(s, ok)))
    }

    /// Ordered alternation. The first alternative whose whole continuation
    /// succeeds wins; an empty list always fails.
    #[must_use]
    pub fn choice(mut routers: Vec<Router<T, R>>) -> Self {
        match routers.len() {
            0 => Router::empty(),
            1 => routers.remove(0),
            _ => Router::new(move |s, ok| routers.iter().find_map(|r| r.run(s.clone(), ok))),
        }
    }

    /// Transform the yielded value.
    #[must_use]
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Router<U, R> {
        let inner = self.clone();
        Router::new(move |s, ok: &dyn Fn(U, State) -> Option<R>| {
            inner.run(s, &|x, s| ok(f(x), s))
        })
    }

    /// Feed the yielded value into `f` and continue with the router it
    /// returns.
    #[must_use]
    pub fn chain<U: 'static>(
        &self,
        f: impl Fn(T) -> Router<U, R> + Send + Sync + 'static,
    ) -> Router<U, R> {
        let inner = self.clone();
        Router::new(move |s, ok: &dyn Fn(U, State) -> Option<R>| {
            inner.run(s, &|x, s| f(x).run(s, ok))
        })
    }

    /// Run `self`, discard its value, then run `next`.
    #[must_use]
    pub fn then<U: 'static>(&self, next: &Router<U, R>) -> Router<U, R> {
        let (inner, next) = (self.clone(), next.clone());
        Router::new(move |s, ok: &dyn Fn(U, State) -> Option<R>| {
            inner.run(s, &|_, s| next.run(s, ok))
        })
    }

    /// Consume the first path segment if `p` accepts it.
    ///
    /// Fails when no segments are left.
    #[must_use]
    pub fn segment(p: Predicate<T, R>) -> Self {
        Router::new(move |s, ok| {
            let path = s.path_arc();
            let segment = path.get(s.cursor())?;
            let mut rest = s;
            rest.advance(1);
            p.test(segment, rest, ok)
        })
    }

    /// Glob: consume zero or more whole segments, joined with `/`, so that
    /// both `p` and `next` succeed.
    ///
    /// Fails when no segments are left. Shorter consumption is tried first,
    /// starting with the empty string.
    #[must_use]
    pub fn segments<U: 'static>(p: Predicate<T, R>, next: &Router<U, R>) -> Router<U, R> {
        let next = next.clone();
        Router::new(move |s, ok: &dyn Fn(U, State) -> Option<R>| {
            let path = s.path_arc();
            let start = s.cursor();
            if start >= path.len() {
                return None;
            }
            (start..=path.len()).find_map(|end| {
                let joined = path[start..end].join("/");
                let mut rest = s.clone();
                rest.advance(end - start);
                p.test(&joined, rest, &|_, s| next.run(s, ok))
            })
        })
    }

    /// Consume the fragment if there is one and `p` accepts it.
    #[must_use]
    pub fn fragment(p: Predicate<T, R>) -> Self {
        Router::new(move |mut s, ok| {
            let fragment = s.take_fragment()?;
            p.test(&fragment, s, ok)
        })
    }

    /// Consume the method if there is one and `p` accepts it.
    #[must_use]
    pub fn method(p: Predicate<T, R>) -> Self {
        Router::new(move |mut s, ok| {
            let method = s.take_method()?;
            p.test(&method, s, ok)
        })
    }
}

impl<R: 'static> Router<(), R> {
    /// Succeeds only when every path segment has been consumed.
    #[must_use]
    pub fn end() -> Self {
        Router::new(|s, ok| {
            if s.remaining_path().is_empty() {
                ok((), s)
            } else {
                None
            }
        })
    }

    /// Accept the end of the path or consume one empty segment, the one a
    /// trailing `/` produces.
    #[must_use]
    pub fn trailing_slash() -> Self {
        Router::new(|mut s, ok| {
            match s.remaining_path().first().map(String::is_empty) {
                None => ok((), s),
                Some(true) => {
                    s.advance(1);
                    ok((), s)
                }
                Some(false) => None,
            }
        })
    }
}

impl<A, B, R> Router<(A, B), R>
where
    A: Clone + 'static,
    B: 'static,
    R: 'static,
{
    /// Consume one query pair whose key satisfies `key` and whose value
    /// satisfies `value`.
    ///
    /// Open pairs are tried from the last one in the request backwards;
    /// only the pair that matched is removed.
    #[must_use]
    pub fn query(key: Predicate<A, R>, value: Predicate<B, R>) -> Self {
        Router::pair(PairKind::Query, key, value)
    }

    /// Consume one header pair, tried in the same order as [`Router::query`].
    #[must_use]
    pub fn header(key: Predicate<A, R>, value: Predicate<B, R>) -> Self {
        Router::pair(PairKind::Header, key, value)
    }

    fn pair(kind: PairKind, key: Predicate<A, R>, value: Predicate<B, R>) -> Self {
        Router::new(move |s, ok: &dyn Fn((A, B), State) -> Option<R>| {
            let (pairs, open) = s.pairs(kind);
            (0..open.len()).rev().find_map(|slot| {
                let (k, v) = &pairs[open[slot]];
                let mut rest = s.clone();
                rest.consume_pair(kind, slot);
                key.test(k, rest, &|a, s| {
                    value.test(v, s, &|b, s| ok((a.clone(), b), s))
                })
            })
        })
    }
}

impl<R: 'static> Router<Captures, R> {
    /// Append the yielded captures to the state.
    #[must_use]
    pub fn save(&self) -> Self {
        let inner = self.clone();
        Router::new(move |s, ok: &dyn Fn(Captures, State) -> Option<R>| {
            inner.run(s, &|xs, mut s| {
                s.save(&xs);
                ok(xs, s)
            })
        })
    }
}

impl<T: 'static> Router<T, (T, State)> {
    /// Run to completion, returning the value and the final state of the
    /// first full match.
    #[must_use]
    pub fn evaluate(&self, state: State) -> Option<(T, State)> {
        self.run(state, &|x, s| Some((x, s)))
    }
}

/// A router parameterised by one input string.
pub struct Predicate<T, R> {
    test: Arc<Test<T, R>>,
}

impl<T, R> Clone for Predicate<T, R> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: 'static, R: 'static> Predicate<T, R> {
    pub fn new(
        test: impl Fn(&str, State, &dyn Fn(T, State) -> Option<R>) -> Option<R>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            test: Arc::new(test),
        }
    }

    /// Test `input`; on success continue with `ok`.
    pub fn test(&self, input: &str, state: State, ok: &dyn Fn(T, State) -> Option<R>) -> Option<R> {
        (self.test)(input, state, ok)
    }

    /// Fix the input, producing a plain router.
    #[must_use]
    pub fn apply(&self, input: impl Into<String>) -> Router<T, R> {
        let (p, input) = (self.clone(), input.into());
        Router::new(move |s, ok| p.test(&input, s, ok))
    }

    #[must_use]
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Predicate<U, R> {
        let inner = self.clone();
        Predicate::new(move |x, s, ok: &dyn Fn(U, State) -> Option<R>| {
            inner.test(x, s, &|v, s| ok(f(v), s))
        })
    }
}

impl<R: 'static> Predicate<String, R> {
    /// Accept inputs for which `f` holds, yielding the input.
    #[must_use]
    pub fn satisfy(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Predicate::new(move |x, s, ok| if f(x) { ok(x.to_string(), s) } else { None })
    }

    /// Accept exactly `text`, optionally ignoring case.
    #[must_use]
    pub fn exact(text: &str, case_insensitive: bool) -> Self {
        if case_insensitive {
            let folded = text.to_lowercase();
            Predicate::satisfy(move |x| x.chars().flat_map(char::to_lowercase).eq(folded.chars()))
        } else {
            let text = text.to_string();
            Predicate::satisfy(move |x| x == text)
        }
    }
}

impl<R: 'static> Predicate<Captures, R> {
    /// Accept inputs `regex` matches, yielding its groups after the whole
    /// match. Groups that did not take part yield an empty string.
    #[must_use]
    pub fn matches(regex: Regex) -> Self {
        Predicate::new(move |x, s, ok| {
            let caps = regex.captures(x)?;
            let groups: Captures = caps
                .iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect();
            ok(groups, s)
        })
    }

    /// Append the yielded captures to the state.
    #[must_use]
    pub fn save(&self) -> Self {
        let inner = self.clone();
        Predicate::new(move |x, s, ok: &dyn Fn(Captures, State) -> Option<R>| {
            inner.test(x, s, &|xs, mut s| {
                s.save(&xs);
                ok(xs, s)
            })
        })
    }
}
