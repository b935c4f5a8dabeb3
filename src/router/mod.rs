//! # Router Module
//!
//! Ties the pipeline together: rules are brace-expanded, parsed, merged into a
//! [`crate::tree::Tree`] and compiled into one backtracking matcher that every
//! dispatch runs against.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Collecting rules and their actions through [`RouterBuilder`]
//! - Compiling the merged tree into a [`crate::combinator::Router`]
//! - Matching normalized [`crate::request::Request`]s and returning the action
//!   with its captures in declaration order
//!
//! ## Architecture
//!
//! 1. **Finalization**: every rule is expanded and parsed, conflicting rules
//!    abort the build, and each tree node becomes a primitive matcher. Sibling
//!    nodes turn into an ordered `choice`, so the tree order is the precedence
//!    order.
//!
//! 2. **Dispatch**: a fresh match state is built from the request and the
//!    compiled matcher walks it. Failed alternatives are retried on a clone of
//!    the state taken at the decision point, so nothing a failed branch
//!    consumed or captured leaks into its siblings.
//!
//! ## Example
//!
//! ```rust,ignore
//! use routecomb::router::RouterBuilder;
//! use routecomb::tree::Options;
//!
//! let mut builder = RouterBuilder::new();
//! builder.get("/users/*", "show_user");
//! builder.get("/users/me", "show_me");
//! let router = builder.finalize(&Options::default())?;
//!
//! let m = router.route("GET", "/users/me").unwrap();
//! assert_eq!(*m.action, "show_me");
//! ```

mod compile;
mod core;

pub use self::compile::{compile, Matcher, Outcome};
pub use self::core::{RouteMatch, Router, RouterBuilder};
