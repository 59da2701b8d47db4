mod common;

use common::{call, get};
use yhttp::{Application, Method, Request, Status};

async fn get_index(_req: Request) -> &'static str { "get index" }
async fn post_index(_req: Request) -> &'static str { "post index" }

#[tokio::test]
async fn dispatches_by_verb() {
    let app = Application::new()
        .get("/", get_index)
        .post("/", post_index);

    let res = get(&app, "/").await;
    assert_eq!(res.status_code(), Status::OK);
    assert_eq!(res.text_body(), "get index");

    let res = call(&app, Method::Post, "/").await;
    assert_eq!(res.text_body(), "post index");

    let res = app.handle(Request::builder().verb("INVALID").build()).await;
    assert_eq!(res.status_code(), Status::METHOD_NOT_ALLOWED);

    let res = call(&app, Method::Delete, "/").await;
    assert_eq!(res.status_code(), Status::METHOD_NOT_ALLOWED);

    let res = get(&app, "/invalid").await;
    assert_eq!(res.status_code(), Status::NOT_FOUND);
}

#[tokio::test]
async fn capture_groups_become_arguments() {
    async fn by_id(req: Request) -> String {
        req.arg(0).unwrap_or_default().to_owned()
    }
    async fn by_id_and_title(req: Request) -> String {
        format!("{} {}", req.arg(0).unwrap_or_default(), req.arg(1).unwrap_or("Empty"))
    }

    let app = Application::new()
        .get(r"/(\d+)", by_id)
        .post(r"/(\d+)/?(\w+)?", by_id_and_title);

    assert_eq!(get(&app, "/12").await.text_body(), "12");
    assert_eq!(get(&app, "/").await.status_code(), Status::NOT_FOUND);
    assert_eq!(get(&app, "/foo").await.status_code(), Status::NOT_FOUND);
    assert_eq!(get(&app, "/1/2").await.status_code(), Status::NOT_FOUND);

    assert_eq!(call(&app, Method::Post, "/12/foo").await.text_body(), "12 foo");
    assert_eq!(call(&app, Method::Post, "/12").await.text_body(), "12 Empty");
}

#[tokio::test]
async fn first_registered_match_wins() {
    async fn specific(_req: Request) -> &'static str { "specific" }
    async fn catch_all(_req: Request) -> &'static str { "catch-all" }

    let app = Application::new()
        .get("/books/new", specific)
        .get("/books/.*", catch_all);

    assert_eq!(get(&app, "/books/new").await.text_body(), "specific");
    assert_eq!(get(&app, "/books/42").await.text_body(), "catch-all");
}

#[tokio::test]
async fn query_string_does_not_affect_matching() {
    async fn search(req: Request) -> String {
        req.query().text("q").unwrap_or_default().to_owned()
    }

    let app = Application::new().get("/search", search);
    assert_eq!(get(&app, "/search?q=rust").await.text_body(), "rust");
}

#[tokio::test]
async fn named_groups_are_params() {
    async fn user(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or_default())
    }

    let app = Application::new().get(r"/users/(?P<id>\d+)", user);
    assert_eq!(get(&app, "/users/7").await.text_body(), "user 7");
}
