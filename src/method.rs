//! HTTP method as a typed enum.
//!
//! Covers the RFC 9110 standard methods. Any other verb still reaches the
//! application as a raw string on the [`Request`](crate::Request) and is
//! answered with `405 Method Not Allowed` before it reaches a handler.

use std::fmt;
use std::str::FromStr;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

// Single source for both directions of the wire mapping.
const WIRE: [(Method, &str); 9] = [
    (Method::Connect, "CONNECT"),
    (Method::Delete,  "DELETE"),
    (Method::Get,     "GET"),
    (Method::Head,    "HEAD"),
    (Method::Options, "OPTIONS"),
    (Method::Patch,   "PATCH"),
    (Method::Post,    "POST"),
    (Method::Put,     "PUT"),
    (Method::Trace,   "TRACE"),
];

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        WIRE.iter()
            .find(|(m, _)| *m == self)
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }

    /// Every method, in wire-name order.
    pub fn all() -> impl Iterator<Item = Method> {
        WIRE.iter().map(|(m, _)| *m)
    }
}

/// Returned when a verb is not one of the RFC 9110 methods.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown HTTP method `{0}`")]
pub struct UnknownMethod(pub String);

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WIRE.iter()
            .find(|(_, wire)| *wire == s)
            .map(|(m, _)| *m)
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnknownMethod;

    fn try_from(m: &http::Method) -> Result<Self, Self::Error> {
        m.as_str().parse()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_for_every_method() {
        for m in Method::all() {
            assert_eq!(m.as_str().parse::<Method>(), Ok(m));
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert_eq!("get".parse::<Method>(), Err(UnknownMethod("get".into())));
        assert!("INVALID".parse::<Method>().is_err());
    }

    #[test]
    fn converts_from_http_method() {
        assert_eq!(Method::try_from(&http::Method::PATCH), Ok(Method::Patch));
        let custom = http::Method::from_bytes(b"PURGE").unwrap();
        assert!(Method::try_from(&custom).is_err());
    }
}
