//! Listening endpoint that can be closed from another task
//!
//! Waiting for a peer has no timeout, so a stop request cannot rely on the
//! waiting task noticing a flag. Instead the endpoint hands out an
//! [`EndpointCloser`] that any thread or task may trigger while `accept()` is
//! pending. A closed endpoint fails its pending and future accepts with the
//! same `io::Error` type a broken socket would produce; telling the two apart
//! is the caller's job.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::constants::{ERR_ENDPOINT_CLOSED, LISTEN_BACKLOG};

/// Handle that closes a [`ListeningEndpoint`] from anywhere
///
/// Closing is sticky and idempotent.
#[derive(Debug, Clone)]
pub struct EndpointCloser {
    closed: Arc<watch::Sender<bool>>,
}

impl EndpointCloser {
    /// Close the endpoint, waking a pending `accept()`
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    /// Returns true once `close()` has been called
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// A bound TCP listener for one receiver session
///
/// Dropping the endpoint releases the OS socket. Endpoints are never reused
/// across sessions.
#[derive(Debug)]
pub struct ListeningEndpoint {
    listener: TcpListener,
    local_addr: SocketAddr,
    closed_rx: watch::Receiver<bool>,
    closer: EndpointCloser,
}

impl ListeningEndpoint {
    /// Bind a new endpoint on `addr`
    ///
    /// The address is marked reusable so a new session can bind the same
    /// port right after the previous one closed. Must be called from within a
    /// tokio runtime.
    pub fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        #[cfg(unix)]
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(LISTEN_BACKLOG)?;
        socket.set_nonblocking(true)?;

        let listener = TcpListener::from_std(socket.into())?;
        let local_addr = listener.local_addr()?;

        let (closed_tx, closed_rx) = watch::channel(false);

        Ok(Self {
            listener,
            local_addr,
            closed_rx,
            closer: EndpointCloser {
                closed: Arc::new(closed_tx),
            },
        })
    }

    /// Address the endpoint is actually bound to (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A handle that can close this endpoint from another task
    pub fn closer(&self) -> EndpointCloser {
        self.closer.clone()
    }

    /// Returns true once the endpoint has been closed
    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }

    /// Wait for the next peer
    ///
    /// Fails with `ConnectionAborted` as soon as the endpoint is closed, even
    /// if a peer is already queued.
    pub async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        tokio::select! {
            biased;
            _ = wait_closed(&mut self.closed_rx) => {
                Err(io::Error::new(io::ErrorKind::ConnectionAborted, ERR_ENDPOINT_CLOSED))
            }
            result = self.listener.accept() => result,
        }
    }
}

/// Resolve once the closed flag has been raised
async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    while !*closed.borrow_and_update() {
        if closed.changed().await.is_err() {
            // The sender lives as long as the endpoint, so this never resolves
            std::future::pending::<()>().await;
        }
    }
}
