//! Minimal yhttp example: a small book store with forms, cookies, a redirect
//! and static files.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic -- serve --bind 127.0.0.1:8080
//!
//! Try:
//!   curl http://localhost:8080/books/42
//!   curl -X POST http://localhost:8080/books -d 'title=Dune'
//!   curl -X POST http://localhost:8080/books \
//!        -H 'content-type: application/json' -d '{"title":"Dune"}'
//!   curl -i http://localhost:8080/old
//!   curl http://localhost:8080/demos/basic.rs

use std::process::ExitCode;

use yhttp::{Application, Cookie, HttpStatus, Json, Request, statuses};

fn main() -> ExitCode {
    Application::new()
        .get(r"/books/(\d+)", get_book)
        .post("/books", create_book)
        .get("/old", moved)
        .static_directory("/demos/", "demos")
        .when_ready(|app| tracing::info!(routes = app.routes().len(), "ready"))
        .climain(std::env::args_os())
}

// GET /books/(\d+)
//
// Capture groups arrive as positional arguments.
async fn get_book(req: Request) -> Result<Json<serde_json::Value>, HttpStatus> {
    let id: u32 = req.arg(0)
        .and_then(|id| id.parse().ok())
        .ok_or_else(statuses::not_found)?;
    let last_seen = req.cookies().get("last_book");
    req.cookies().set(Cookie::new("last_book", id.to_string()).with_path("/"));
    Ok(Json(serde_json::json!({ "id": id, "last_seen": last_seen })))
}

// POST /books
//
// Works the same for urlencoded, JSON and multipart bodies.
async fn create_book(req: Request) -> Result<String, HttpStatus> {
    let form = req.form().await?;
    let title = form.text("title").ok_or_else(|| {
        statuses::bad_request().with_text("Field missing: title")
    })?;
    Ok(format!("created {title}"))
}

// GET /old → 301 /books/1
async fn moved(_req: Request) -> HttpStatus {
    statuses::moved_permanently("/books/1")
}
