//! Regular-expression request router.
//!
//! One ordered route list per HTTP method. Each pattern is anchored at both
//! ends and tried in registration order; the first match wins.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::statuses::{self, HttpStatus};

struct Route {
    pattern: String,
    regex: Regex,
    handler: BoxedHandler,
}

/// A successful lookup: the handler plus what the pattern captured.
pub(crate) struct Matched {
    pub handler: BoxedHandler,
    pub args: Vec<String>,
    pub params: HashMap<String, String>,
}

#[derive(Default)]
pub(crate) struct Router {
    routes: HashMap<Method, Vec<Route>>,
}

impl Router {
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression. Routes are
    /// registered at start-up, where a bad pattern is a programming error.
    pub fn add(&mut self, method: Method, pattern: &str, handler: BoxedHandler) {
        let regex = Regex::new(&format!("^{pattern}$"))
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        self.routes.entry(method).or_default().push(Route {
            pattern: pattern.to_owned(),
            regex,
            handler,
        });
    }

    /// `405` when nothing is registered for the verb, `404` when nothing matches.
    pub fn lookup(&self, method: Option<Method>, path: &str) -> Result<Matched, HttpStatus> {
        let routes = method
            .and_then(|m| self.routes.get(&m))
            .filter(|routes| !routes.is_empty())
            .ok_or_else(statuses::method_not_allowed)?;

        for route in routes {
            let Some(caps) = route.regex.captures(path) else { continue };

            let args = caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_owned())
                .collect();
            let params = route.regex.capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_owned(), m.as_str().to_owned())))
                .collect();

            return Ok(Matched { handler: Arc::clone(&route.handler), args, params });
        }

        Err(statuses::not_found())
    }

    /// Registered `(method, pattern)` pairs, methods in wire-name order.
    pub fn list(&self) -> Vec<(Method, &str)> {
        let mut methods: Vec<_> = self.routes.keys().copied().collect();
        methods.sort_by_key(|m| m.as_str());
        methods.into_iter()
            .flat_map(|m| self.routes[&m].iter().map(move |r| (m, r.pattern.as_str())))
            .collect()
    }
}
