use std::time::Duration;

use yhttp::{Application, Cookie, HttpStatus, Request, SameSite, statuses};

#[tokio::test]
async fn handlers_read_and_set_cookies() {
    async fn counter(req: Request) -> String {
        let visits: u32 = req.cookies()
            .get("visits")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        req.cookies().set(
            Cookie::new("visits", (visits + 1).to_string())
                .with_path("/")
                .with_max_age(Duration::from_secs(60))
                .http_only(true)
                .with_same_site(SameSite::Lax),
        );
        format!("visit {visits}")
    }

    let app = Application::new().get("/", counter);
    let res = app.handle(Request::builder().header("cookie", "visits=2; theme=dark").build()).await;

    assert_eq!(res.text_body(), "visit 2");
    assert_eq!(
        res.header_all("set-cookie").collect::<Vec<_>>(),
        vec!["visits=3; Max-Age=60; Path=/; HttpOnly; SameSite=Lax"],
    );
}

#[tokio::test]
async fn untouched_cookies_are_not_echoed() {
    async fn noop(_req: Request) -> &'static str { "" }

    let app = Application::new().get("/", noop);
    let res = app.handle(Request::builder().header("cookie", "a=1").build()).await;
    assert_eq!(res.header("set-cookie"), None);
}

#[tokio::test]
async fn cookies_survive_status_signals() {
    async fn logout(req: Request) -> HttpStatus {
        req.cookies().remove("session");
        req.cookies().set(Cookie::new("flash", "bye"));
        statuses::see_other("/")
    }

    let app = Application::new().get("/logout", logout);
    let res = app.handle(Request::builder().uri("/logout").header("cookie", "session=abc").build()).await;

    assert_eq!(res.header("location"), Some("/"));
    let cookies: Vec<_> = res.header_all("set-cookie").collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with("session=; Expires=Thu, 01 Jan 1970"));
    assert_eq!(cookies[1], "flash=bye");
}
