//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::OnceLock;

use bytes::Bytes;
use tokio::sync::OnceCell;

use crate::cookies::{CookieJar, Cookies};
use crate::form::Form;
use crate::method::Method;
use crate::statuses::{self, HttpStatus};

const CANNOT_PARSE: &str = "Cannot parse the request";

/// An incoming HTTP request.
///
/// Built by the server for every request on the wire, or by
/// [`Request::builder`] when driving an [`Application`](crate::Application)
/// in-process.
pub struct Request {
    pub(crate) verb: String,
    pub(crate) method: Option<Method>,
    pub(crate) path: String,
    pub(crate) query_string: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) args: Vec<String>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) cookies: Cookies,
    query: OnceLock<Form>,
    form: OnceCell<Form>,
}

impl Request {
    pub(crate) fn new(
        verb: String,
        target: &str,
        headers: Vec<(String, String)>,
        body: Bytes,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        let (path, query_string) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        let cookies = CookieJar::parse(
            headers.iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("cookie"))
                .map(|(_, v)| v.as_str()),
        );
        Self {
            method: verb.parse().ok(),
            verb,
            path: if path.is_empty() { "/".to_owned() } else { path.to_owned() },
            query_string: query_string.to_owned(),
            headers,
            body,
            remote_addr,
            args: Vec::new(),
            params: HashMap::new(),
            cookies: Cookies::new(cookies),
            query: OnceLock::new(),
            form: OnceCell::new(),
        }
    }

    /// Converts a request received by hyper, with its body already collected.
    pub(crate) fn from_parts(
        parts: http::request::Parts,
        body: Bytes,
        remote_addr: SocketAddr,
    ) -> Self {
        let headers = parts.headers.iter()
            .map(|(k, v)| {
                // obs-text survives lossily rather than vanishing.
                (k.as_str().to_owned(), String::from_utf8_lossy(v.as_bytes()).into_owned())
            })
            .collect();
        let target = parts.uri.path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Self::new(parts.method.as_str().to_owned(), target, headers, body, Some(remote_addr))
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// The verb as sent by the client, e.g. `"GET"` or `"INVALID"`.
    pub fn verb(&self) -> &str { &self.verb }
    /// `None` when the verb is not an RFC 9110 method.
    pub fn method(&self) -> Option<Method> { self.method }
    pub fn path(&self) -> &str { &self.path }
    /// The raw query string, without the `?`.
    pub fn query_string(&self) -> &str { &self.query_string }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Positional route arguments: the capture groups that participated in
    /// the match, in order. A group that matched the empty string is kept.
    ///
    /// For a route `/(\d+)/(\w+)?`, `/12` gives `["12"]` and `/12/foo` gives
    /// `["12", "foo"]`.
    pub fn args(&self) -> &[String] { &self.args }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Returns a named capture group.
    ///
    /// For a route `/users/(?P<id>\d+)`, `req.param("id")` on `/users/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The media type of the body, without parameters (`charset`, `boundary`).
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length")?.trim().parse().ok()
    }

    /// The decoded query string. Decoded once, on first use.
    pub fn query(&self) -> &Form {
        self.query.get_or_init(|| Form::from_urlencoded(self.query_string.as_bytes()))
    }

    /// The decoded request form. Decoded once, on first use.
    ///
    /// The body is decoded according to its content type. A request without
    /// a content type yields its query string, so `GET` forms work unchanged.
    pub async fn form(&self) -> Result<&Form, HttpStatus> {
        self.form.get_or_try_init(|| self.decode_form()).await
    }

    async fn decode_form(&self) -> Result<Form, HttpStatus> {
        let Some(content_type) = self.content_type() else {
            return Ok(self.query().clone());
        };

        if content_type.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            return Ok(Form::from_urlencoded(&self.body));
        }

        if content_type.eq_ignore_ascii_case("application/json") {
            if self.content_length().unwrap_or(0) == 0 {
                return Err(statuses::bad_request().with_text("Content-Length required"));
            }
            return Form::from_json(&self.body).map_err(|e| {
                statuses::bad_request().with_text(CANNOT_PARSE).with_detail(e.to_string())
            });
        }

        if content_type.eq_ignore_ascii_case("multipart/form-data") {
            let header = self.header("content-type").unwrap_or_default();
            let boundary = multer::parse_boundary(header)
                .ok()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| {
                    statuses::bad_request().with_text(CANNOT_PARSE).with_detail("missing boundary")
                })?;
            return Form::from_multipart(self.body.clone(), &boundary).await.map_err(|e| {
                statuses::bad_request().with_text(CANNOT_PARSE).with_detail(e.to_string())
            });
        }

        if self.body.is_empty() {
            return Ok(self.query().clone());
        }
        Err(statuses::unsupported_media_type()
            .with_detail(format!("cannot decode a form from `{content_type}`")))
    }

    /// The request's cookie jar. Changes are sent back as `set-cookie` headers.
    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    pub(crate) fn set_route_match(&mut self, args: Vec<String>, params: HashMap<String, String>) {
        self.args = args;
        self.params = params;
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Builds a [`Request`] without a network connection.
///
/// ```rust
/// use yhttp::{Method, Request};
///
/// let req = Request::builder()
///     .method(Method::Post)
///     .uri("/books?draft=1")
///     .form(&[("title", "Dune")])
///     .build();
/// assert_eq!(req.query().text("draft"), Some("1"));
/// ```
pub struct RequestBuilder {
    verb: String,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            verb: Method::Get.as_str().to_owned(),
            uri: "/".to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }
}

impl RequestBuilder {
    pub fn method(self, method: Method) -> Self {
        self.verb(method.as_str())
    }

    /// Sets a raw verb, including ones that are not RFC 9110 methods.
    pub fn verb(mut self, verb: &str) -> Self {
        self.verb = verb.to_owned();
        self
    }

    /// Path and optional query string, e.g. `/books?page=2`.
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_owned();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Raw body. `content-length` is filled in by [`build`](Self::build) when missing.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// URL-encoded form body with its content type.
    pub fn form(self, fields: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.header("content-type", "application/x-www-form-urlencoded").body(body)
    }

    /// JSON body with its content type.
    pub fn json(self, value: &serde_json::Value) -> Self {
        let body = value.to_string();
        self.header("content-type", "application/json").body(body)
    }

    pub fn build(mut self) -> Request {
        let has_length = self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-length"));
        if !has_length && !self.body.is_empty() {
            self.headers.push(("content-length".to_owned(), self.body.len().to_string()));
        }
        Request::new(self.verb, &self.uri, self.headers, self.body, self.remote_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormValue;
    use crate::status::Status;

    #[test]
    fn non_ascii_header_values_are_kept() {
        let (parts, ()) = http::Request::builder()
            .uri("/menu?lang=fr")
            .header("cookie", http::HeaderValue::from_bytes(b"dish=caf\xe9").unwrap())
            .body(())
            .unwrap()
            .into_parts();
        let req = Request::from_parts(parts, Bytes::new(), "127.0.0.1:4000".parse().unwrap());
        assert_eq!(req.header("Cookie"), Some("dish=caf\u{FFFD}"));
        assert_eq!(req.cookies().get("dish").as_deref(), Some("caf\u{FFFD}"));
        assert_eq!(req.query_string(), "lang=fr");
    }

    #[test]
    fn splits_path_and_query() {
        let req = Request::builder().uri("/books?page=2&sort=asc").build();
        assert_eq!(req.path(), "/books");
        assert_eq!(req.query_string(), "page=2&sort=asc");
        assert_eq!(req.query().text("page"), Some("2"));
        assert_eq!(req.method(), Some(Method::Get));
    }

    #[test]
    fn unknown_verbs_are_kept_raw() {
        let req = Request::builder().verb("INVALID").build();
        assert_eq!(req.verb(), "INVALID");
        assert_eq!(req.method(), None);
    }

    #[test]
    fn content_type_drops_parameters() {
        let req = Request::builder()
            .header("Content-Type", "multipart/form-data; boundary=abc")
            .build();
        assert_eq!(req.content_type(), Some("multipart/form-data"));
    }

    #[test]
    fn builder_fills_content_length() {
        let req = Request::builder().body("abc").build();
        assert_eq!(req.content_length(), Some(3));
        assert_eq!(Request::builder().build().content_length(), None);
    }

    #[tokio::test]
    async fn form_falls_back_to_query() {
        let req = Request::builder().uri("/?foo=bar").build();
        assert_eq!(req.form().await.unwrap().text("foo"), Some("bar"));
    }

    #[tokio::test]
    async fn json_form_needs_a_length() {
        let req = Request::builder().header("content-type", "application/json").build();
        let err = req.form().await.unwrap_err();
        assert_eq!(err.status_line(), "400 Content-Length required");
    }

    #[tokio::test]
    async fn json_form_decodes_objects() {
        let req = Request::builder()
            .method(Method::Post)
            .json(&serde_json::json!({ "foo": "bar" }))
            .build();
        assert_eq!(req.form().await.unwrap().get("foo"), Some(&FormValue::Text("bar".into())));
    }

    #[tokio::test]
    async fn unknown_body_type_is_unsupported() {
        let req = Request::builder()
            .header("content-type", "application/xml")
            .body("<a/>")
            .build();
        assert_eq!(req.form().await.unwrap_err().status(), Status::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn cookies_come_from_headers() {
        let req = Request::builder().header("cookie", "theme=dark").build();
        assert_eq!(req.cookies().get("theme").as_deref(), Some("dark"));
    }
}
