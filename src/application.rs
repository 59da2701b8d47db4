//! The application: routes, settings, lifecycle hooks and request dispatch.

use std::path::PathBuf;

use tracing::debug;

use crate::handler::Handler;
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::settings::Settings;
use crate::statics;

type LifecycleHook = Box<dyn Fn(&Application) + Send + Sync + 'static>;
type ResponseHook = Box<dyn Fn(&Response) + Send + Sync + 'static>;

/// A web application.
///
/// Build it once at startup, then pass it to [`Server::serve`](crate::Server::serve)
/// or drive it directly with [`Application::handle`]. Every registration
/// method returns `self`, so they chain:
///
/// ```rust
/// use yhttp::{Application, HttpStatus, Request, statuses};
///
/// async fn index(_req: Request) -> &'static str { "index" }
///
/// async fn book(req: Request) -> Result<String, HttpStatus> {
///     let id = req.arg(0).ok_or_else(statuses::not_found)?;
///     Ok(format!("book {id}"))
/// }
///
/// let app = Application::new()
///     .get("/", index)
///     .get(r"/books/(\d+)", book)
///     .static_directory("/assets/", "public");
/// ```
pub struct Application {
    router: Router,
    settings: Settings,
    on_ready: Vec<LifecycleHook>,
    on_shutdown: Vec<LifecycleHook>,
    on_end_response: Vec<ResponseHook>,
}

impl Application {
    /// An application with built-in settings (`debug: true`).
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            router: Router::default(),
            settings,
            on_ready: Vec::new(),
            on_shutdown: Vec::new(),
            on_end_response: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    // ── Routing ──────────────────────────────────────────────────────────────

    /// Registers `handler` for `method` on the regular expression `pattern`.
    ///
    /// The pattern must match the whole path. Its capture groups reach the
    /// handler as [`Request::args`] (and [`Request::param`] for named groups).
    /// Patterns for one method are tried in registration order.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    pub fn route(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.router.add(method, pattern, handler.into_boxed_handler());
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Put, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Patch, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Delete, pattern, handler)
    }

    pub fn head(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Head, pattern, handler)
    }

    pub fn options(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Options, pattern, handler)
    }

    /// Serves the file at `path` for `GET pattern`.
    ///
    /// ```rust
    /// # use yhttp::Application;
    /// Application::new().static_file("/favicon.ico", "assets/favicon.ico");
    /// ```
    pub fn static_file(self, pattern: &str, path: impl Into<PathBuf>) -> Self {
        self.get(pattern, statics::file(path.into()))
    }

    /// Serves the files inside `directory` by name under `prefix`:
    /// `static_directory("/foo/", "public")` answers `GET /foo/a.txt` with
    /// `public/a.txt`. Names that leave the directory get `403 Forbidden`.
    pub fn static_directory(self, prefix: &str, directory: impl Into<PathBuf>) -> Self {
        self.get(&format!("{prefix}(.*)"), statics::directory(directory.into()))
    }

    /// Registered `(method, pattern)` pairs.
    pub fn routes(&self) -> Vec<(Method, &str)> {
        self.router.list()
    }

    // ── Hooks ────────────────────────────────────────────────────────────────

    /// Runs `hook` when [`ready`](Self::ready) is called.
    pub fn when_ready(mut self, hook: impl Fn(&Application) + Send + Sync + 'static) -> Self {
        self.on_ready.push(Box::new(hook));
        self
    }

    /// Runs `hook` when [`shutdown`](Self::shutdown) is called.
    pub fn when_shutdown(mut self, hook: impl Fn(&Application) + Send + Sync + 'static) -> Self {
        self.on_shutdown.push(Box::new(hook));
        self
    }

    /// Runs `hook` with every response, after cookies are written.
    pub fn when_end_response(mut self, hook: impl Fn(&Response) + Send + Sync + 'static) -> Self {
        self.on_end_response.push(Box::new(hook));
        self
    }

    /// Fires the `ready` hooks. [`Server::serve`](crate::Server::serve) calls
    /// this before accepting connections; call it yourself when embedding.
    pub fn ready(&self) {
        for hook in &self.on_ready {
            hook(self);
        }
    }

    /// Fires the `shutdown` hooks.
    pub fn shutdown(&self) {
        for hook in &self.on_shutdown {
            hook(self);
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Routes one request and produces one response.
    ///
    /// Routing failures and status signals returned by the handler become
    /// plain-text status responses. Cookie changes made through
    /// [`Request::cookies`] are written as `set-cookie` headers either way.
    pub async fn handle(&self, mut req: Request) -> Response {
        let verb = req.verb().to_owned();
        let path = req.path().to_owned();
        let cookies = req.cookies().clone();

        let mut response = match self.router.lookup(req.method(), req.path()) {
            Ok(matched) => {
                req.set_route_match(matched.args, matched.params);
                matched.handler.call(req).await
            }
            Err(signal) => signal.into_response(),
        };

        response.resolve_debug_detail(self.settings.debug);
        for cookie in cookies.output() {
            response.add_header("set-cookie", &cookie);
        }

        debug!(verb = %verb, path = %path, status = response.status_code().code(), "request handled");

        for hook in &self.on_end_response {
            hook(&response);
        }
        response
    }
}

impl Default for Application {
    fn default() -> Self { Self::new() }
}
