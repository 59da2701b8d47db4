//! # yhttp
//!
//! A micro HTTP framework: regular-expression routing per verb, query and
//! form decoding, cookies, static files, and status signals raised straight
//! from handlers.
//!
//! ## What it does
//!
//! - Regex routing — anchored patterns, capture groups become handler arguments
//! - Forms — query strings, urlencoded, JSON and multipart bodies
//! - Cookies — read incoming ones, set or remove them from any handler
//! - Status signals — `Err(statuses::not_found())?` ends a request
//! - Static files — single files or whole directories
//! - Async I/O — tokio + hyper, HTTP/1.1 and HTTP/2, graceful shutdown
//!
//! TLS, rate limiting and body-size limits belong to the reverse proxy.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use yhttp::{Application, HttpStatus, Json, Request, Server, statuses};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Application::new()
//!         .get(r"/books/(\d+)", get_book)
//!         .post("/books", create_book)
//!         .static_directory("/assets/", "public");
//!
//!     Server::bind("0.0.0.0:8080").unwrap().serve(app).await.unwrap();
//! }
//!
//! async fn get_book(req: Request) -> Result<Json<serde_json::Value>, HttpStatus> {
//!     let id: u32 = req.arg(0).and_then(|id| id.parse().ok()).ok_or_else(statuses::not_found)?;
//!     Ok(Json(serde_json::json!({ "id": id })))
//! }
//!
//! async fn create_book(req: Request) -> Result<String, HttpStatus> {
//!     let form = req.form().await?;
//!     let title = form.text("title").ok_or_else(|| {
//!         statuses::bad_request().with_text("Field missing: title")
//!     })?;
//!     Ok(format!("created {title}"))
//! }
//! ```

mod application;
mod cli;
mod cookies;
mod error;
mod form;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod settings;
mod statics;
mod status;

pub mod statuses;

pub use application::Application;
pub use cookies::{Cookie, CookieJar, Cookies, SameSite};
pub use error::Error;
pub use form::{Form, FormFile, FormValue};
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use request::{Request, RequestBuilder};
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use server::Server;
pub use settings::{ServerSettings, Settings};
pub use status::Status;
pub use statuses::HttpStatus;
