//! Router core: rule registration and the dispatch hot path.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::combinator::{Captures, State};
use crate::error::Error;
use crate::expand::expand_rule;
use crate::request::Request;
use crate::tree::{build, Options, Rule, RouteTrace};

use super::compile::{compile, Matcher};

/// Dispatches slower than this are logged as warnings.
const SLOW_MATCH: Duration = Duration::from_millis(1);

/// Result of successfully dispatching a request.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a, A> {
    /// Action registered for the winning rule
    pub action: &'a A,
    /// Declaration index of the winning (expanded) rule
    pub rule: usize,
    /// Captured values in declaration order
    pub captures: Captures,
    /// What the winning route left unconsumed (unrelated queries and headers)
    pub remaining: State,
}

impl<A> RouteMatch<'_, A> {
    /// Capture at `index`, if the route captured that many values.
    #[inline]
    #[must_use]
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(String::as_str)
    }
}

/// Collects rules and their actions.
///
/// Each rule is brace-expanded on registration; every expansion shares the
/// same action.
pub struct RouterBuilder<A> {
    rules: Vec<Rule>,
    rule_actions: Vec<usize>,
    actions: Vec<A>,
}

impl<A> Default for RouterBuilder<A> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            rule_actions: Vec::new(),
            actions: Vec::new(),
        }
    }
}

impl<A> RouterBuilder<A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` with `action`.
    ///
    /// # Arguments
    ///
    /// * `rule` - url, optional method and headers, all brace-expandable
    /// * `action` - opaque payload returned when the rule wins
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// builder.on(Rule::new("/{a,b}").method("{GET,POST}").header("n"), handler);
    /// ```
    pub fn on(&mut self, rule: Rule, action: A) -> &mut Self {
        let index = self.actions.len();
        self.actions.push(action);
        for expanded in expand_rule(&rule) {
            self.rules.push(expanded);
            self.rule_actions.push(index);
        }
        self
    }

    pub fn get(&mut self, url: &str, action: A) -> &mut Self {
        self.on(Rule::new(url).method("GET"), action)
    }

    pub fn post(&mut self, url: &str, action: A) -> &mut Self {
        self.on(Rule::new(url).method("POST"), action)
    }

    pub fn put(&mut self, url: &str, action: A) -> &mut Self {
        self.on(Rule::new(url).method("PUT"), action)
    }

    pub fn delete(&mut self, url: &str, action: A) -> &mut Self {
        self.on(Rule::new(url).method("DELETE"), action)
    }

    /// Register `url` for every method.
    pub fn all(&mut self, url: &str, action: A) -> &mut Self {
        self.on(Rule::new(url), action)
    }

    /// Number of rules after expansion.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Merge and compile everything registered so far.
    ///
    /// # Errors
    ///
    /// Any [`Error`] from parsing, merging or regex compilation. Nothing is
    /// built on failure.
    pub fn finalize(self, options: &Options) -> Result<Router<A>, Error> {
        let tree = build(&self.rules, options)?;
        let matcher = compile(tree.roots(), options.case, options.trim)?;
        let traces = tree.traces();
        let mut trace_index = vec![0; self.rules.len()];
        for (position, trace) in traces.iter().enumerate() {
            if let Some(slot) = trace_index.get_mut(trace.action) {
                *slot = position;
            }
        }

        let routes_summary: Vec<String> = traces.iter().take(10).map(ToString::to_string).collect();
        info!(
            routes_count = traces.len(),
            actions_count = self.actions.len(),
            trim = options.trim,
            case = options.case,
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Router {
            matcher,
            actions: self.actions,
            rule_actions: self.rule_actions,
            traces,
            trace_index,
        })
    }
}

/// A compiled rule set.
///
/// Read-only once built; dispatches from many threads may share it.
#[derive(Clone)]
pub struct Router<A> {
    matcher: Matcher,
    actions: Vec<A>,
    /// Expanded rule index to action index
    rule_actions: Vec<usize>,
    /// Routes in the order they are tried
    traces: Vec<RouteTrace>,
    /// Expanded rule index to position in `traces`
    trace_index: Vec<usize>,
}

impl<A: fmt::Debug> fmt::Debug for Router<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.traces.len())
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

impl<A> Router<A> {
    /// Match `request` against every route.
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - the first route, in precedence order, whose
    ///   every node matched
    /// * `None` - nothing matched
    #[must_use]
    pub fn dispatch(&self, request: &Request) -> Option<RouteMatch<'_, A>> {
        debug!(
            method = %request.method,
            path = %request.path_str(),
            "Route match attempt"
        );

        let match_start = Instant::now();
        let result = self.matcher.evaluate(request.to_state());
        let match_duration = match_start.elapsed();

        let Some((rule, state)) = result else {
            warn!(
                method = %request.method,
                path = %request.path_str(),
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            return None;
        };

        let action = self.action(rule)?;
        let captures = state.captures().clone();

        if match_duration > SLOW_MATCH {
            warn!(
                method = %request.method,
                path = %request.path_str(),
                route = %self.trace(rule).map(ToString::to_string).unwrap_or_default(),
                captures = ?captures,
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        } else {
            info!(
                method = %request.method,
                path = %request.path_str(),
                route = %self.trace(rule).map(ToString::to_string).unwrap_or_default(),
                captures = ?captures,
                duration_us = match_duration.as_micros(),
                "Route matched"
            );
        }

        Some(RouteMatch {
            action,
            rule,
            captures,
            remaining: state,
        })
    }

    /// Dispatch a request with no headers.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// if let Some(m) = router.route("GET", "/users/123?expand=posts") {
    ///     println!("user {}", m.capture(0).unwrap_or_default());
    /// }
    /// ```
    #[must_use]
    pub fn route(&self, method: &str, target: &str) -> Option<RouteMatch<'_, A>> {
        self.dispatch(&Request::new(method, target))
    }

    /// Every route in the order dispatch tries them.
    #[must_use]
    pub fn traces(&self) -> &[RouteTrace] {
        &self.traces
    }

    /// Action registered for the expanded rule with declaration index `rule`.
    #[must_use]
    pub fn action(&self, rule: usize) -> Option<&A> {
        self.rule_actions
            .get(rule)
            .and_then(|&index| self.actions.get(index))
    }

    /// Trace of the expanded rule with declaration index `rule`.
    #[must_use]
    pub fn trace(&self, rule: usize) -> Option<&RouteTrace> {
        self.trace_index
            .get(rule)
            .and_then(|&position| self.traces.get(position))
    }

    /// Number of routes after expansion.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

impl<A: fmt::Display> Router<A> {
    /// Print all routes to stdout in match order.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.traces.len());
        for trace in &self.traces {
            match self.action(trace.action) {
                Some(action) => println!("[route] {} -> {}", trace, action),
                None => println!("[route] {}", trace),
            }
        }
    }
}
