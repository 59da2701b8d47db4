mod common;

use common::get;
use yhttp::{Application, Status};

#[tokio::test]
async fn serves_a_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "hello").unwrap();

    let app = Application::new().static_file("/a.txt", &path);
    let res = get(&app, "/a.txt").await;

    assert_eq!(res.status_code(), Status::OK);
    assert_eq!(res.header("content-type"), Some("text/plain"));
    assert_eq!(res.text_body(), "hello");
    assert_eq!(get(&app, "/b.txt").await.status_code(), Status::NOT_FOUND);
}

#[tokio::test]
async fn missing_static_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = Application::new().static_file("/gone.txt", dir.path().join("gone.txt"));
    assert_eq!(get(&app, "/gone.txt").await.status_code(), Status::NOT_FOUND);
}

#[tokio::test]
async fn serves_a_directory_by_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub").join("b.html"), "<b>").unwrap();

    let app = Application::new().static_directory("/foo/", dir.path());

    assert_eq!(get(&app, "/foo/a.txt").await.text_body(), "a");

    let res = get(&app, "/foo/sub/b.html").await;
    assert_eq!(res.header("content-type"), Some("text/html"));
    assert_eq!(res.text_body(), "<b>");

    assert_eq!(get(&app, "/foo/").await.status_code(), Status::NOT_FOUND);
    assert_eq!(get(&app, "/foo/sub").await.status_code(), Status::NOT_FOUND);
    assert_eq!(get(&app, "/foo/missing.txt").await.status_code(), Status::NOT_FOUND);
    assert_eq!(get(&app, "/foo/../secret").await.status_code(), Status::FORBIDDEN);
}
