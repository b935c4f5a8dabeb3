//! # Request Module
//!
//! Normalizes a request into the shape the matcher consumes: path segments,
//! decoded query pairs, an optional fragment, the method, and header pairs
//! with lower-cased names.
//!
//! The path is split on `/` without decoding, so `/a/b` becomes
//! `["", "a", "b"]` and a trailing slash leaves an empty last segment.

use url::{form_urlencoded, Url};

use crate::combinator::State;

/// A request as seen by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub fragment: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Build a request from a method and a request target.
    ///
    /// `target` may be origin-form (`/a?b=1#c`) or an absolute URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let req = Request::new("GET", "/users/42?expand=posts")
    ///     .header("Accept", "application/json");
    /// assert_eq!(req.path, vec!["", "users", "42"]);
    /// ```
    #[must_use]
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query, fragment) = split_target(target);
        Self {
            method: method.into(),
            path: path.split('/').map(str::to_string).collect(),
            query: query
                .map(|q| {
                    form_urlencoded::parse(q.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            fragment,
            headers: Vec::new(),
        }
    }

    /// Add a header. Names are lower-cased.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// Convert an [`http::Request`]. Header values that are not valid
    /// UTF-8 are skipped.
    #[must_use]
    pub fn from_http<B>(request: &http::Request<B>) -> Self {
        let mut normalized = Request::new(request.method().as_str(), &request.uri().to_string());
        normalized.headers = request
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        normalized
    }

    /// Fresh match state for this request.
    #[must_use]
    pub fn to_state(&self) -> State {
        State::new(
            self.path.clone(),
            self.query.clone(),
            self.fragment.clone(),
            Some(self.method.clone()),
            self.headers.clone(),
        )
    }

    /// The path joined back together.
    #[must_use]
    pub fn path_str(&self) -> String {
        self.path.join("/")
    }
}

/// Split a target into path, raw query and fragment.
fn split_target(target: &str) -> (String, Option<String>, Option<String>) {
    if target.contains("://") {
        if let Ok(url) = Url::parse(target) {
            return (
                url.path().to_string(),
                url.query().map(str::to_string),
                url.fragment().map(str::to_string),
            );
        }
    }

    let (rest, fragment) = match target.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment.to_string())),
        None => (target, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (rest, None),
    };
    (path.to_string(), query, fragment)
}
