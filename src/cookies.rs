//! Request cookies and `Set-Cookie` output.
//!
//! Every request carries a [`CookieJar`] seeded from its `Cookie` headers.
//! Handlers read, set and remove cookies through [`Request::cookies`]; once the
//! handler returns, the application writes one `set-cookie` header per change.
//!
//! ```rust
//! use std::time::Duration;
//! use yhttp::{Cookie, Request, SameSite};
//!
//! async fn login(req: Request) -> &'static str {
//!     let visits = req.cookies().get("visits").and_then(|v| v.parse::<u32>().ok());
//!     req.cookies().set(
//!         Cookie::new("visits", (visits.unwrap_or(0) + 1).to_string())
//!             .with_path("/")
//!             .with_max_age(Duration::from_secs(3600))
//!             .http_only(true)
//!             .with_same_site(SameSite::Lax),
//!     );
//!     "welcome"
//! }
//! ```
//!
//! [`Request::cookies`]: crate::Request::cookies

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

/// Cookie `SameSite` attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "Strict",
            Self::Lax    => "Lax",
            Self::None   => "None",
        })
    }
}

/// A cookie to send back to the client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<Duration>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// The name must be an HTTP token and the value plain cookie octets
    /// (no whitespace, `"`, `,`, `;` or `\`); encode anything else before
    /// calling. [`CookieJar::set`] drops cookies that break these rules.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            expires: None,
            max_age: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// `true` when the cookie renders to a well-formed `Set-Cookie` value.
    pub fn is_valid(&self) -> bool {
        let value = self.value.strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(&self.value);
        !self.name.is_empty()
            && self.name.bytes().all(is_token_byte)
            && value.bytes().all(is_cookie_octet)
            && [&self.path, &self.domain].into_iter().flatten()
                .all(|attr| attr.bytes().all(|b| b != b';' && !b.is_ascii_control()))
    }

    /// Renders the `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);

        if let Some(expires) = &self.expires {
            out.push_str(&format!("; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT")));
        }
        if let Some(max_age) = &self.max_age {
            out.push_str(&format!("; Max-Age={}", max_age.as_secs()));
        }
        if let Some(domain) = &self.domain {
            out.push_str(&format!("; Domain={domain}"));
        }
        if let Some(path) = &self.path {
            out.push_str(&format!("; Path={path}"));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if let Some(same_site) = &self.same_site {
            out.push_str(&format!("; SameSite={same_site}"));
        }
        out
    }
}

// ── CookieJar ─────────────────────────────────────────────────────────────────

/// Incoming cookies plus the changes made while handling one request.
#[derive(Debug, Default)]
pub struct CookieJar {
    incoming: HashMap<String, String>,
    // Last write per name wins; order is first-write order.
    pending: Vec<Cookie>,
}

impl CookieJar {
    /// Parses the values of every `Cookie` request header.
    pub fn parse<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut incoming = HashMap::new();
        for header in headers {
            for pair in header.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else { continue };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                // First occurrence wins, as browsers send the most specific path first.
                incoming.entry(name.to_owned()).or_insert_with(|| value.to_owned());
            }
        }
        Self { incoming, pending: Vec::new() }
    }

    /// Current value: pending changes shadow incoming cookies.
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(cookie) = self.pending.iter().find(|c| c.name == name) {
            return cookie_alive(cookie).then_some(cookie.value.as_str());
        }
        self.incoming.get(name).map(String::as_str)
    }

    pub fn set(&mut self, cookie: Cookie) {
        if !cookie.is_valid() {
            warn!(cookie = %cookie.name, "dropping cookie with characters not allowed in set-cookie");
            return;
        }
        match self.pending.iter_mut().find(|c| c.name == cookie.name) {
            Some(slot) => *slot = cookie,
            None => self.pending.push(cookie),
        }
    }

    /// Tells the client to drop `name` by sending it already expired.
    pub fn remove(&mut self, name: &str) {
        self.set(
            Cookie::new(name, "")
                .with_max_age(Duration::ZERO)
                .with_expires(DateTime::<Utc>::UNIX_EPOCH),
        );
    }

    /// Incoming cookie names and values.
    pub fn incoming(&self) -> &HashMap<String, String> {
        &self.incoming
    }

    /// One `Set-Cookie` header value per changed cookie.
    pub fn output(&self) -> Vec<String> {
        self.pending.iter().map(Cookie::to_header_value).collect()
    }
}

// RFC 9110 tchar.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

// RFC 6265 cookie-octet.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

fn cookie_alive(cookie: &Cookie) -> bool {
    cookie.max_age != Some(Duration::ZERO)
}

/// Shared handle on a request's [`CookieJar`].
///
/// Cloning is cheap; the application keeps one clone to emit the changes
/// after the handler has consumed the request.
#[derive(Clone, Debug, Default)]
pub struct Cookies(Arc<Mutex<CookieJar>>);

impl Cookies {
    pub(crate) fn new(jar: CookieJar) -> Self {
        Self(Arc::new(Mutex::new(jar)))
    }

    fn lock(&self) -> MutexGuard<'_, CookieJar> {
        // The jar holds plain data; a panic elsewhere cannot leave it torn.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).map(str::to_owned)
    }

    pub fn set(&self, cookie: Cookie) {
        self.lock().set(cookie);
    }

    pub fn remove(&self, name: &str) {
        self.lock().remove(name);
    }

    pub fn output(&self) -> Vec<String> {
        self.lock().output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_every_cookie_header() {
        let jar = CookieJar::parse(["a=1; b=\"two\"", "c=3;;=bad; d"]);
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("two"));
        assert_eq!(jar.get("c"), Some("3"));
        assert_eq!(jar.get("d"), None);
        assert_eq!(jar.incoming().len(), 3);
    }

    #[test]
    fn renders_attributes() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let cookie = Cookie::new("session", "abc")
            .with_path("/")
            .with_domain("example.com")
            .with_expires(expires)
            .with_max_age(Duration::from_secs(60))
            .secure(true)
            .http_only(true)
            .with_same_site(SameSite::Strict);
        assert_eq!(
            cookie.to_header_value(),
            "session=abc; Expires=Wed, 02 Jan 2030 03:04:05 GMT; Max-Age=60; \
             Domain=example.com; Path=/; Secure; HttpOnly; SameSite=Strict",
        );
    }

    #[test]
    fn last_write_per_name_wins() {
        let mut jar = CookieJar::default();
        jar.set(Cookie::new("a", "1"));
        jar.set(Cookie::new("b", "2"));
        jar.set(Cookie::new("a", "3"));
        assert_eq!(jar.output(), vec!["a=3".to_owned(), "b=2".to_owned()]);
    }

    #[test]
    fn removal_shadows_incoming_value() {
        let mut jar = CookieJar::parse(["token=xyz"]);
        jar.remove("token");
        assert_eq!(jar.get("token"), None);
        assert_eq!(
            jar.output(),
            vec!["token=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0".to_owned()],
        );
    }

    #[test]
    fn attribute_injection_is_dropped() {
        let mut jar = CookieJar::default();
        jar.set(Cookie::new("a", "x; Domain=evil"));
        jar.set(Cookie::new("b c", "1"));
        jar.set(Cookie::new("d", "1").with_path("/; Secure"));
        jar.set(Cookie::new("e", "\"quoted\""));
        assert!(!Cookie::new("f", "x,y").is_valid());
        assert_eq!(jar.output(), vec!["e=\"quoted\"".to_owned()]);
        assert_eq!(jar.get("a"), None);
    }

    #[test]
    fn untouched_jar_emits_nothing() {
        let cookies = Cookies::new(CookieJar::parse(["a=1"]));
        assert_eq!(cookies.get("a").as_deref(), Some("1"));
        assert!(cookies.output().is_empty());
    }
}
