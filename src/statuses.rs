//! Status signals raised from handlers.
//!
//! A handler that cannot produce its normal response returns one of these
//! instead, usually through `?`:
//!
//! ```rust
//! use yhttp::{HttpStatus, Request, statuses};
//!
//! async fn get_book(req: Request) -> Result<String, HttpStatus> {
//!     let id: u32 = req.arg(0)
//!         .and_then(|id| id.parse().ok())
//!         .ok_or_else(statuses::bad_request)?;
//!     if id > 100 {
//!         return Err(statuses::not_found());
//!     }
//!     Ok(format!("book {id}"))
//! }
//! ```
//!
//! The application renders the signal as a `text/plain` response whose body is
//! the status line. With `debug` enabled the body also carries the detail.

use std::fmt;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// An HTTP status signal: status code, text and extra headers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpStatus {
    status: Status,
    text: String,
    headers: Vec<(String, String)>,
    detail: Option<String>,
}

impl HttpStatus {
    /// A signal for `status` whose text is the canonical reason phrase.
    pub fn new(status: Status) -> Self {
        Self {
            status,
            text: status.reason().to_owned(),
            headers: Vec::new(),
            detail: None,
        }
    }

    /// Replaces the text shown after the code, e.g. `400 Content-Length required`.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attaches a detail rendered only when the application runs in debug mode.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn status(&self) -> Status { self.status }
    pub fn text(&self) -> &str { &self.text }
    pub fn detail(&self) -> Option<&str> { self.detail.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// `"<code> <text>"`
    pub fn status_line(&self) -> String {
        format!("{} {}", self.status.code(), self.text)
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_line())
    }
}

impl std::error::Error for HttpStatus {}

impl From<Status> for HttpStatus {
    fn from(status: Status) -> Self {
        Self::new(status)
    }
}

impl IntoResponse for HttpStatus {
    fn into_response(self) -> Response {
        let body = self.status_line().into_bytes();
        let mut headers = vec![("content-type".to_owned(), TEXT_PLAIN.to_owned())];
        headers.extend(self.headers);
        Response {
            body,
            headers,
            status: self.status,
            reason: Some(self.text),
            // Always present: the application decides whether to render it.
            debug_detail: Some(self.detail.unwrap_or_default()),
        }
    }
}

// ── Factories ────────────────────────────────────────────────────────────────

macro_rules! factories {
    ($( $(#[$doc:meta])* $name:ident => $status:ident; )+) => {
        $(
            $(#[$doc])*
            pub fn $name() -> HttpStatus {
                HttpStatus::new(Status::$status)
            }
        )+
    };
}

factories! {
    /// `400 Bad Request`
    bad_request => BAD_REQUEST;
    /// `401 Unauthorized`
    unauthorized => UNAUTHORIZED;
    /// `403 Forbidden`
    forbidden => FORBIDDEN;
    /// `404 Not Found`
    not_found => NOT_FOUND;
    /// `405 Method Not Allowed`
    method_not_allowed => METHOD_NOT_ALLOWED;
    /// `409 Conflict`
    conflict => CONFLICT;
    /// `410 Gone`
    gone => GONE;
    /// `411 Length Required`
    length_required => LENGTH_REQUIRED;
    /// `412 Precondition Failed`
    precondition_failed => PRECONDITION_FAILED;
    /// `415 Unsupported Media Type`
    unsupported_media_type => UNSUPPORTED_MEDIA_TYPE;
    /// `422 Unprocessable Content`
    unprocessable_content => UNPROCESSABLE_CONTENT;
    /// `500 Internal Server Error`
    internal_server_error => INTERNAL_SERVER_ERROR;
    /// `502 Bad Gateway`
    bad_gateway => BAD_GATEWAY;
    /// `503 Service Unavailable`
    service_unavailable => SERVICE_UNAVAILABLE;
    /// `304 Not Modified`
    not_modified => NOT_MODIFIED;
}

macro_rules! redirects {
    ($( $(#[$doc:meta])* $name:ident => $status:ident; )+) => {
        $(
            $(#[$doc])*
            pub fn $name(location: &str) -> HttpStatus {
                HttpStatus::new(Status::$status).with_header("location", location)
            }
        )+
    };
}

redirects! {
    /// `301 Moved Permanently` to `location`
    moved_permanently => MOVED_PERMANENTLY;
    /// `302 Found` to `location`
    found => FOUND;
    /// `303 See Other` to `location`
    see_other => SEE_OTHER;
    /// `307 Temporary Redirect` to `location`
    temporary_redirect => TEMPORARY_REDIRECT;
    /// `308 Permanent Redirect` to `location`
    permanent_redirect => PERMANENT_REDIRECT;
}

/// An arbitrary status with custom text, e.g. `status(499, "Client Closed")`.
pub fn status(code: u16, text: &str) -> HttpStatus {
    HttpStatus::new(Status::from_code(code)).with_text(text)
}
