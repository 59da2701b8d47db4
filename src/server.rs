//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Stops accepting new connections.
//! 2. Closes idle keep-alive connections and lets in-flight requests run to
//!    completion.
//! 3. Fires the application's `shutdown` hooks and returns from
//!    [`Server::serve`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::application::Application;
use crate::error::Error;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::statuses;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    listener: Option<std::net::TcpListener>,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use yhttp::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// assert_eq!(server.addr().port(), 3000);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse().map_err(|source| Error::InvalidAddress {
            addr: addr.to_owned(),
            source,
        })?;
        Ok(Self { addr, listener: None })
    }

    /// Serves on an already bound listener, e.g. one bound to port `0`.
    ///
    /// # Errors
    ///
    /// Fails if the listener's address cannot be read or it cannot be made
    /// non-blocking.
    pub fn from_listener(listener: std::net::TcpListener) -> Result<Self, Error> {
        listener.set_nonblocking(true)?;
        Ok(Self { addr: listener.local_addr()?, listener: Some(listener) })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Fires `ready`, then accepts connections and dispatches them through
    /// `app` until SIGTERM or Ctrl-C.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, app: Application) -> Result<(), Error> {
        self.serve_with_shutdown(app, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    ///
    /// On shutdown, new connections are refused, idle keep-alive connections
    /// are closed, requests in flight run to completion, and then the
    /// application's `shutdown` hooks fire.
    pub async fn serve_with_shutdown<F>(self, app: Application, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = match self.listener {
            Some(listener) => TcpListener::from_std(listener)?,
            None => TcpListener::bind(self.addr).await?,
        };
        let app = Arc::new(app);
        app.ready();

        info!(addr = %self.addr, "yhttp listening");

        let mut tasks = tokio::task::JoinSet::new();
        let (stop_tx, stop_rx) = watch::channel(());
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let stop = stop_rx.clone();
                    tasks.spawn(connection(app, TokioIo::new(stream), remote_addr, stop));
                }

                // Reap finished connection tasks.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);
        let _ = stop_tx.send(());
        while tasks.join_next().await.is_some() {}

        app.shutdown();
        info!("yhttp stopped");
        Ok(())
    }
}

/// Drives one connection until the peer closes it or, once `stop` fires,
/// until hyper has finished its graceful shutdown.
async fn connection(
    app: Arc<Application>,
    io: TokioIo<TcpStream>,
    remote_addr: SocketAddr,
    mut stop: watch::Receiver<()>,
) {
    // Called once per request on the connection.
    let svc = service_fn(move |req| {
        let app = Arc::clone(&app);
        async move { dispatch(app, req, remote_addr).await }
    });

    let builder = ConnBuilder::new(TokioExecutor::new());
    let conn = builder.serve_connection(io, svc);
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(e) = res {
                    error!(peer = %remote_addr, "connection error: {e}");
                }
                break;
            }
            _ = stop.changed(), if !draining => {
                debug!(peer = %remote_addr, "closing connection");
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Collects the body and hands the request to the application. Failures are
/// answered with a response, so hyper never sees an error.
async fn dispatch(
    app: Arc<Application>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %remote_addr, "cannot read request body: {e}");
            let mut response = statuses::bad_request().into_response();
            response.resolve_debug_detail(false);
            return Ok(response.into_inner());
        }
    };

    let response = app.handle(Request::from_parts(parts, body, remote_addr)).await;
    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C only on non-Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => { signal.recv().await; }
            Err(e) => {
                error!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
