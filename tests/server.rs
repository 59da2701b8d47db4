use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::time::timeout;
use yhttp::{Application, Request, Server, Settings};

async fn hello(_req: Request) -> &'static str {
    "hello"
}

/// Reads from `stream` until a full response ending in `body` has arrived.
async fn read_response(stream: &mut TcpStream, body: &str) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !String::from_utf8_lossy(&buf).ends_with(body) {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed early: {}", String::from_utf8_lossy(&buf));
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let ready = Arc::new(AtomicBool::new(false));
    let stopped = Arc::new(AtomicBool::new(false));

    let app = Application::new()
        .get("/hello", hello)
        .when_ready({
            let ready = Arc::clone(&ready);
            move |_: &Application| ready.store(true, Ordering::SeqCst)
        })
        .when_shutdown({
            let stopped = Arc::clone(&stopped);
            move |_: &Application| stopped.store(true, Ordering::SeqCst)
        });

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let server = Server::from_listener(listener).unwrap();
    let addr = server.addr();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(server.serve_with_shutdown(app, async {
        let _ = stop_rx.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /hello HTTP/1.1\r\nhost: localhost\r\n\r\n")
        .await
        .unwrap();
    let response = timeout(Duration::from_secs(5), read_response(&mut stream, "hello"))
        .await
        .unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(ready.load(Ordering::SeqCst));
    assert!(!stopped.load(Ordering::SeqCst));

    // The connection stays open and idle while the server shuts down.
    stop_tx.send(()).unwrap();
    let finished = timeout(Duration::from_secs(5), serving).await;
    assert!(matches!(finished, Ok(Ok(Ok(())))), "server did not stop: {finished:?}");
    assert!(stopped.load(Ordering::SeqCst));

    let mut rest = Vec::new();
    let n = timeout(Duration::from_secs(5), stream.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap_or(0);
    assert_eq!(n, 0);
}

#[tokio::test]
async fn status_signals_reach_the_wire() {
    let app = Application::with_settings(Settings { debug: false, ..Settings::default() })
        .get("/hello", hello);
    let server = Server::from_listener(std::net::TcpListener::bind("127.0.0.1:0").unwrap()).unwrap();
    let addr = server.addr();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(server.serve_with_shutdown(app, async {
        let _ = stop_rx.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /missing HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    let response = timeout(Duration::from_secs(5), read_response(&mut stream, "404 Not Found"))
        .await
        .unwrap();
    assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
    assert!(response.to_ascii_lowercase().contains("content-type: text/plain"), "{response}");

    stop_tx.send(()).unwrap();
    assert!(matches!(timeout(Duration::from_secs(5), serving).await, Ok(Ok(Ok(())))));
}
