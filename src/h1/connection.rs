use futures_util::FutureExt;
use std::{any::Any, net::SocketAddr, panic::AssertUnwindSafe};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter},
    sync::Mutex,
};

use super::{
    io::{BoxRead, BoxWrite, ConnReader, SharedWriter},
    parser::{expects_continue, framing, read_head, wants_close},
};
use crate::{
    body::Body, config::Config, log, request::Request, response::Response, service::Handler,
};

/// Serve requests on `io` one at a time until the connection closes.
///
/// A malformed request head, a failed write, or a handler panic closes the connection without
/// a response. Errors are logged, never propagated.
pub(crate) async fn serve<IO, H>(
    io: IO,
    remote_addr: Option<SocketAddr>,
    handler: &H,
    config: &Config,
) where
    IO: AsyncRead + AsyncWrite + Send + 'static,
    H: Handler,
{
    let (read, write) = tokio::io::split(io);
    let read: BoxRead = Box::new(read);
    let write: BoxWrite = Box::new(write);

    let mut reader: ConnReader = BufReader::with_capacity(
        config.get_read_buffer_size(),
        read.take(config.get_max_header_size()),
    );
    let writer: SharedWriter =
        Mutex::new(BufWriter::with_capacity(config.get_write_buffer_size(), write));
    let mut line = Vec::with_capacity(64);

    log::trace!("connection open: {remote_addr:?}");

    loop {
        reader.get_mut().set_limit(config.get_max_header_size());

        let head = match read_head(&mut reader, &mut line).await {
            Ok(Some(head)) => head,
            Ok(None) => break,
            Err(err) => {
                log::debug!("failed to read request: {err}");
                break;
            }
        };

        reader.get_mut().set_limit(u64::MAX);

        log::debug!("{} {} {}", head.method, head.target.as_str(), head.version);

        let framing = framing(&head.method, &head.headers);
        let expect = expects_continue(&head.headers).then_some(&writer);
        let version = head.version;
        let close = wants_close(version, &head.headers);

        let body = Body::new(&mut reader, framing, expect);
        let mut request = Request::new(head, body, remote_addr, config);
        let mut response =
            Response::new(version, &writer, config.get_response_buffer_size(), close);

        let served = AssertUnwindSafe(handler.serve(&mut request, &mut response))
            .catch_unwind()
            .await;

        request.cleanup();

        if let Err(panic) = served {
            log::error!("handler panicked: {}", panic_message(&*panic));
            break;
        }

        if let Err(err) = response.finish().await {
            log::debug!("failed to send response: {err}");
            break;
        }

        let close = response.should_close();

        let body = request.body_mut();
        if body.is_continue_pending() {
            // the client still waits for `100 Continue` before sending the body
            break;
        }
        if let Err(err) = body.drain().await {
            log::debug!("failed to discard request body: {err}");
            break;
        }

        if close {
            break;
        }
    }

    if let Err(err) = writer.into_inner().shutdown().await {
        log::trace!("failed to shutdown connection: {err}");
    }

    log::trace!("connection closed: {remote_addr:?}");
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    match panic.downcast_ref::<&str>() {
        Some(msg) => msg,
        None => panic
            .downcast_ref::<String>()
            .map_or("unknown panic", String::as_str),
    }
}
