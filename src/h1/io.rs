//! Connection stream halves.
use tokio::{
    io::{AsyncRead, AsyncWrite, BufReader, BufWriter, Take},
    sync::Mutex,
};

/// Type erased read half of a connection.
pub(crate) type BoxRead = Box<dyn AsyncRead + Send + Unpin>;

/// Type erased write half of a connection.
pub(crate) type BoxWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Buffered read half, the `Take` caps the bytes of a request head.
pub(crate) type ConnReader = BufReader<Take<BoxRead>>;

/// Buffered write half, shared by the response and the `100 Continue` emitter.
pub(crate) type SharedWriter = Mutex<BufWriter<BoxWrite>>;
