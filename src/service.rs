//! Request handler.
use crate::{request::Request, response::Response};

// ===== Handler =====

/// Application callback invoked once per request.
///
/// The handler reads the [`Request`] and writes the [`Response`]. Once the returned future
/// completes, the response is finalized and the unread request body is discarded.
///
/// ```rust
/// use httpd::{Handler, Request, Response};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     async fn serve(&self, req: &mut Request<'_>, res: &mut Response<'_>) {
///         let name = req.query("name").unwrap_or("World").to_owned();
///         let _ = res.write_all(format!("Hello, {name}!").as_bytes()).await;
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn serve(
        &self,
        req: &mut Request<'_>,
        res: &mut Response<'_>,
    ) -> impl Future<Output = ()> + Send;
}

impl<H: Handler> Handler for std::sync::Arc<H> {
    #[inline]
    fn serve(
        &self,
        req: &mut Request<'_>,
        res: &mut Response<'_>,
    ) -> impl Future<Output = ()> + Send {
        H::serve(self, req, res)
    }
}
