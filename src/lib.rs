//! # routecomb
//!
//! **routecomb** compiles a declarative set of URL rules into one backtracking
//! matcher. Rules constrain path segments, query pairs, the fragment, the
//! method and headers; each constraint may be a literal, an embedded regex, a
//! single-value wildcard `*`, or (for paths) a multi-segment glob `**`.
//!
//! ## Architecture
//!
//! - **[`expand`]** - Brace expansion (`/{a,b}/{1..3}`) of rule declarations
//! - **[`pattern`]** - Pattern grammar, parser and classification
//! - **[`order`]** - Precedence between overlapping patterns
//! - **[`tree`]** - Merging rules into a shared decision tree, with duplicate
//!   and case-conflict detection
//! - **[`combinator`]** - Continuation-passing matcher algebra with backtracking
//! - **[`router`]** - Builder, compilation and dispatch
//! - **[`request`]** - Request normalization
//! - **[`config`]** - Rule files and environment overrides
//! - **[`logging`]** - `tracing` subscriber setup for binaries
//! - **[`cli`]** - The `routecomb` command line
//!
//! ### Build and Dispatch Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant Builder as RouterBuilder
//!     participant Expand as expand
//!     participant Parser as pattern::parse_route
//!     participant Tree as tree::build
//!     participant Compile as router::compile
//!     participant Router
//!
//!     User->>Builder: on(rule, action)
//!     Builder->>Expand: expand_rule(rule)
//!     Expand-->>Builder: concrete rules
//!     User->>Builder: finalize(options)
//!     Builder->>Parser: one node list per rule
//!     Parser-->>Tree: segments, end, queries, fragment, method, headers, handler
//!     Tree->>Tree: group equal leads, sort siblings, recurse
//!     alt duplicate or case conflict
//!         Tree-->>User: Err(Error)
//!     end
//!     Tree-->>Compile: roots
//!     Compile-->>Router: choice of compiled branches
//!
//!     User->>Router: dispatch(request)
//!     Router->>Router: run matcher on a fresh state
//!     alt no route
//!         Router-->>User: None
//!     end
//!     Router-->>User: RouteMatch (action, captures)
//! ```
//!
//! ## Precedence
//!
//! Siblings are tried in this order: path end before further segments,
//! literals before regexes before wildcards before globs, and queries before
//! the fragment, method and headers. Among literals, text order decides; among
//! everything else, declaration order does. A sibling that matches locally
//! but whose remainder fails is abandoned and the next one is tried.
//!
//! ## Example
//!
//! ```rust,ignore
//! use routecomb::router::RouterBuilder;
//! use routecomb::tree::{Options, Rule};
//!
//! let mut builder = RouterBuilder::new();
//! builder.get("/users/(\\d+)", "show_user");
//! builder.on(Rule::new("/search?q").header("accept"), "search");
//! let router = builder.finalize(&Options::default())?;
//!
//! let m = router.route("GET", "/users/42").unwrap();
//! assert_eq!(*m.action, "show_user");
//! assert_eq!(m.captures.as_slice(), ["42"]);
//! ```

pub mod cli;
pub mod combinator;
pub mod config;
pub mod error;
pub mod expand;
pub mod logging;
pub mod order;
pub mod pattern;
pub mod request;
pub mod router;
pub mod tree;

pub use config::{load_rules, RouterOptions, RuleFile};
pub use error::Error;
pub use request::Request;
pub use router::{RouteMatch, Router, RouterBuilder};
pub use tree::{Options, Rule};
