//! Shared helpers for driving an application in-process.

use yhttp::{Application, Method, Request, Response};

/// Dispatches `GET path`.
#[allow(dead_code)]
pub async fn get(app: &Application, path: &str) -> Response {
    app.handle(Request::builder().uri(path).build()).await
}

/// Dispatches `method path` without a body.
#[allow(dead_code)]
pub async fn call(app: &Application, method: Method, path: &str) -> Response {
    app.handle(Request::builder().method(method).uri(path).build()).await
}
