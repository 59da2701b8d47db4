//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it, or return anything that
//! implements [`IntoResponse`]: strings, bytes, [`Json`], a [`Status`], an
//! [`HttpStatus`](crate::HttpStatus) signal, or a `Result` of those.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::status::Status;
use crate::statuses;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Css,          // text/css; charset=utf-8
    Csv,          // text/csv
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Javascript,   // text/javascript; charset=utf-8
    Json,         // application/json; charset=utf-8
    OctetStream,  // application/octet-stream  (binary / file download)
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css         => "text/css; charset=utf-8",
            Self::Csv         => "text/csv",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Javascript  => "text/javascript; charset=utf-8",
            Self::Json        => "application/json; charset=utf-8",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use yhttp::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(Status::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use yhttp::{Response, ContentType, Status};
///
/// Response::builder()
///     .status(Status::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// Response::builder()
///     .bytes(ContentType::Xml, b"<ok/>".to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: Status,
    /// Non-canonical reason phrase for the status line.
    pub(crate) reason: Option<String>,
    /// Set on responses rendered from a status signal; appended in debug mode.
    pub(crate) debug_detail: Option<String>,
}

impl Response {
    /// `200 OK` — `application/json; charset=utf-8`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().bytes(ContentType::Json, body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// `200 OK` — `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::builder().bytes(ContentType::Html, body.into().into_bytes())
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self::builder().status(code).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::OK }
    }

    pub fn status_code(&self) -> Status { self.status }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Body as UTF-8, lossily.
    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First header with this name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every header with this name, in order (e.g. `set-cookie`).
    pub fn header_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers.iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Finishes a status-signal response: in debug mode the detail goes after
    /// the status line, otherwise it is dropped.
    pub(crate) fn resolve_debug_detail(&mut self, debug: bool) {
        if let Some(detail) = self.debug_detail.take() {
            if debug {
                self.body.extend_from_slice(b"\r\n");
                self.body.extend_from_slice(detail.as_bytes());
            }
        }
    }

    /// Converts into the hyper representation, adding `content-length`.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let status = http::StatusCode::from_u16(self.status.code())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        let len = self.body.len();
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = status;

        if let Some(reason) = self.reason.filter(|r| r != self.status.reason()) {
            match hyper::ext::ReasonPhrase::try_from(reason.into_bytes()) {
                Ok(phrase) => { res.extensions_mut().insert(phrase); }
                Err(_) => warn!(status = %self.status, "dropping invalid reason phrase"),
            }
        }

        let headers = res.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => { headers.append(name, value); }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from(len));
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::OK` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json; charset=utf-8`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.bytes(ContentType::Json, body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.bytes(ContentType::Text, body.into().into_bytes())
    }

    /// Terminate with a typed body. Use this for XML, HTML, binary, etc.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(content_type.as_str(), body)
    }

    /// Terminate with a body of a content type not listed in [`ContentType`].
    pub fn raw(self, content_type: &str, body: Vec<u8>) -> Response {
        self.finish(content_type, body)
    }

    /// Terminate with no body (e.g. `Status::NO_CONTENT`).
    pub fn no_body(self) -> Response {
        Response {
            body: Vec::new(),
            headers: self.headers,
            status: self.status,
            reason: None,
            debug_detail: None,
        }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status, reason: None, debug_detail: None }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for Vec<u8> {
    fn into_response(self) -> Response {
        Response::builder().bytes(ContentType::OctetStream, self)
    }
}

impl IntoResponse for Bytes {
    fn into_response(self) -> Response { self.to_vec().into_response() }
}

/// `200 OK` with an empty body.
impl IntoResponse for () {
    fn into_response(self) -> Response { Response::status(Status::OK) }
}

/// Return a [`Status`] directly from a handler: `return Status::NO_CONTENT`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> Response {
        match self {
            Ok(value) => value.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

/// Serializes `T` as a JSON body.
///
/// ```rust
/// use yhttp::{Json, Request};
///
/// async fn get_book(_req: Request) -> Json<serde_json::Value> {
///     Json(serde_json::json!({ "title": "Dune" }))
/// }
/// ```
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Response::json(bytes),
            Err(e) => statuses::internal_server_error()
                .with_detail(format!("cannot serialize response: {e}"))
                .into_response(),
        }
    }
}
