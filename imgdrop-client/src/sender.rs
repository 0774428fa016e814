//! Sender operation
//!
//! One call opens one connection, writes every byte of the source file and
//! closes. Nothing is kept between calls, so any number of sends may run at
//! once on their own tasks.
//!
//! Resolution, connection, read and write failures all collapse into the
//! same `SendFailed` outcome for the observer. The specific fault is only
//! logged.

use std::fmt;
use std::io;

use imgdrop_common::SendEvent;
use imgdrop_common::io::copy_stream;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::request::SendRequest;

/// Error type for one send attempt
#[derive(Debug)]
pub enum SendError {
    /// Host did not resolve or refused the connection
    Connect(io::Error),
    /// Source file could not be opened
    Source(io::Error),
    /// Reading the source or writing the socket failed
    Stream(io::Error),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "connection failed: {}", e),
            Self::Source(e) => write!(f, "could not open source: {}", e),
            Self::Stream(e) => write!(f, "transfer failed: {}", e),
        }
    }
}

impl std::error::Error for SendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) | Self::Source(e) | Self::Stream(e) => Some(e),
        }
    }
}

/// Send one image and report the outcome
///
/// Emits `SendingStarted`, then exactly one of `SendSucceeded` or
/// `SendFailed`. Returns true on success. No retries are attempted.
pub async fn send_image(
    request: &SendRequest,
    id: Uuid,
    events: &mpsc::UnboundedSender<SendEvent>,
) -> bool {
    let _ = events.send(SendEvent::SendingStarted {
        id,
        destination: request.destination(),
    });

    match transfer(request).await {
        Ok(bytes) => {
            log::info!("Send {id}: {bytes} bytes to {}", request.destination());
            let _ = events.send(SendEvent::SendSucceeded { id, bytes });
            true
        }
        Err(e) => {
            log::warn!("Send {id} to {} failed: {e}", request.destination());
            let _ = events.send(SendEvent::SendFailed { id });
            false
        }
    }
}

/// Run [`send_image`] on its own task
///
/// Returns the invocation id used in every event, and the task handle
/// resolving to the outcome.
pub fn spawn_send(
    request: SendRequest,
    events: mpsc::UnboundedSender<SendEvent>,
) -> (Uuid, JoinHandle<bool>) {
    let id = Uuid::new_v4();
    let handle = tokio::spawn(async move { send_image(&request, id, &events).await });
    (id, handle)
}

/// Connect, stream the source, then close
///
/// The write side is shut down explicitly; that close is what tells the
/// receiver the payload is complete.
async fn transfer(request: &SendRequest) -> Result<u64, SendError> {
    let mut stream = TcpStream::connect((request.host(), request.port()))
        .await
        .map_err(SendError::Connect)?;
    log::debug!(
        "Connected to {} for {}",
        stream.peer_addr().map_err(SendError::Connect)?,
        request.source().display()
    );

    let mut source = File::open(request.source())
        .await
        .map_err(SendError::Source)?;

    let bytes = copy_stream(&mut source, &mut stream)
        .await
        .map_err(SendError::Stream)?;
    drop(source);

    stream.shutdown().await.map_err(SendError::Stream)?;
    Ok(bytes)
}
