//! Accept loop.
use std::{
    io,
    net::SocketAddr,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, ready},
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpListener, TcpStream, ToSocketAddrs},
};

#[cfg(unix)]
use tokio::net::{UnixListener, UnixStream};

use crate::{config::Config, h1::connection, log, service::Handler};

// ===== Listener =====

/// A source of accepted connections.
pub trait Listener {
    type Stream: AsyncRead + AsyncWrite + Send + 'static;

    type Addr;

    fn poll_accept(&self, cx: &mut Context) -> Poll<io::Result<(Self::Stream, Self::Addr)>>;

    /// Returns the peer address exposed to handlers, if it is an IP address.
    fn remote_addr(addr: &Self::Addr) -> Option<SocketAddr>;
}

impl Listener for TcpListener {
    type Stream = TcpStream;

    type Addr = SocketAddr;

    fn poll_accept(&self, cx: &mut Context) -> Poll<io::Result<(Self::Stream, Self::Addr)>> {
        TcpListener::poll_accept(self, cx)
    }

    #[inline]
    fn remote_addr(addr: &Self::Addr) -> Option<SocketAddr> {
        Some(*addr)
    }
}

#[cfg(unix)]
impl Listener for UnixListener {
    type Stream = UnixStream;

    type Addr = tokio::net::unix::SocketAddr;

    fn poll_accept(&self, cx: &mut Context) -> Poll<io::Result<(Self::Stream, Self::Addr)>> {
        UnixListener::poll_accept(self, cx)
    }

    #[inline]
    fn remote_addr(_: &Self::Addr) -> Option<SocketAddr> {
        None
    }
}

// ===== Runtime =====

/// Bind a TCP listener on `addr` and serve `handler` with the default [`Config`].
///
/// Only returns if binding fails.
pub async fn listen<A: ToSocketAddrs, H: Handler>(addr: A, handler: H) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    serve(listener, handler).await;
    Ok(())
}

/// Serve a single established connection until it closes.
///
/// The accept loop of [`serve`] runs this for every connection, it is exposed for transports
/// other than [`Listener`].
pub async fn serve_connection<IO, H>(io: IO, handler: &H, config: &Config)
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
    H: Handler,
{
    connection::serve(io, None, handler, config).await;
}

/// Start server with given [`Handler`].
///
/// Each accepted connection is served on its own spawned task, the returned future never
/// completes.
pub fn serve<L: Listener, H: Handler>(io: L, handler: H) -> Serve<L, H> {
    Serve {
        io,
        handler: Arc::new(handler),
        config: Arc::new(Config::default()),
    }
}

#[derive(Debug)]
pub struct Serve<L, H> {
    io: L,
    handler: Arc<H>,
    config: Arc<Config>,
}

impl<L, H> Serve<L, H> {
    /// Replace the server [`Config`].
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Arc::new(config);
        self
    }
}

impl<L, H> Future for Serve<L, H>
where
    L: Listener,
    H: Handler,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            match ready!(self.io.poll_accept(cx)) {
                Ok((io, addr)) => {
                    let handler = Arc::clone(&self.handler);
                    let config = Arc::clone(&self.config);
                    let remote_addr = L::remote_addr(&addr);
                    tokio::spawn(async move {
                        connection::serve(io, remote_addr, &*handler, &config).await;
                    });
                }
                Err(err) => {
                    log::error!("failed to accept connection: {err}");
                }
            }
        }
    }
}
