//! Handler trait and type erasure.
//!
//! Routes hold handlers of different concrete types in one list, so each
//! handler is wrapped once at registration and stored as a trait object:
//!
//! ```text
//! async fn get_book(req: Request) -> Result<String, HttpStatus> { … }
//!        ↓ app.get(r"/books/(\d+)", get_book)
//! get_book.into_boxed_handler()                    ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(get_book))                    ← BoxedHandler
//!        ↓ per request
//! handler.call(req)                                ← one virtual call
//!        ↓
//! Box::pin(async { get_book(req).await.into_response() })
//! ```
//!
//! Closures work too, which is how the static file handlers carry their
//! paths.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the signature of the public
/// [`Handler`] trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared by every request that hits its route.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function or closure of the shape
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// Sealed: the blanket impl below is the only implementation.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    #[tokio::test]
    async fn closures_capture_state() {
        let greeting = Arc::new(String::from("hi"));
        let handler = move |_req: Request| {
            let greeting = Arc::clone(&greeting);
            async move { greeting.to_string() }
        };
        let res = handler.into_boxed_handler().call(Request::builder().build()).await;
        assert_eq!(res.body(), b"hi");
    }

    #[tokio::test]
    async fn status_results_are_converted() {
        async fn teapot(_req: Request) -> Status { Status::IM_A_TEAPOT }
        let res = teapot.into_boxed_handler().call(Request::builder().build()).await;
        assert_eq!(res.status_code(), Status::IM_A_TEAPOT);
    }
}
