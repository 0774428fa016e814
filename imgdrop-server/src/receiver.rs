//! Receiver loop for one server session
//!
//! ```text
//! Idle ──bind──▶ Listening ──accept──▶ Transferring ──drained──▶ Listening ...
//!   │                │                      │
//!   └─bind error─▶ Failed   ◀─accept error──┤ (stop not requested)
//!                  Stopped  ◀─accept error──┘ (stop requested)
//!                  Failed   ◀─stream error
//! ```
//!
//! Peers are served strictly one at a time on the session's own task: the
//! next accept only starts after the previous payload has been persisted and
//! reported. A peer that never closes its side of the stream stalls the
//! session, since closing the connection is the only end-of-transfer signal.
//!
//! A stop request raises the cancellation flag and then closes the endpoint.
//! The close surfaces here as an ordinary accept error, so the flag is the
//! only thing that separates a requested stop from a broken socket.

use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use imgdrop_common::io::copy_stream;
use imgdrop_common::preview::load_preview_async;
use imgdrop_common::{ReceiveFailure, ServerEvent, SessionState};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

use crate::endpoint::{EndpointCloser, ListeningEndpoint};
use crate::server::ServerConfig;
use crate::storage::open_artifact;

/// Closer of the session's endpoint, present only while it is bound
pub(crate) type EndpointSlot = Arc<Mutex<Option<EndpointCloser>>>;

/// Everything one session needs; owned by the session task
pub(crate) struct Session {
    pub config: ServerConfig,
    pub cancelled: Arc<AtomicBool>,
    pub endpoint_slot: EndpointSlot,
    pub events: mpsc::UnboundedSender<ServerEvent>,
    pub state: watch::Sender<SessionState>,
}

impl Session {
    /// Run the session to a terminal state
    pub(crate) async fn run(self) -> SessionState {
        let addr = SocketAddr::new(self.config.bind, self.config.port);

        let mut endpoint = match ListeningEndpoint::bind(addr) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                log::error!("Failed to bind {addr}: {e}");
                return self.finish(Err(ReceiveFailure::Bind));
            }
        };
        log::info!("Server session bound to {}", endpoint.local_addr());

        // Publish the closer before the first look at the flag. A concurrent
        // stop either sees the closer or its flag is seen by serve().
        self.set_endpoint(Some(endpoint.closer()));

        let outcome = self.serve(&mut endpoint).await;

        self.set_endpoint(None);
        drop(endpoint);

        self.finish(outcome)
    }

    /// Accept and drain peers until stopped or failed
    async fn serve(&self, endpoint: &mut ListeningEndpoint) -> Result<(), ReceiveFailure> {
        loop {
            if self.is_cancelled() {
                log::debug!("Stop requested before accept");
                return Ok(());
            }

            self.set_state(SessionState::Listening);
            self.emit(ServerEvent::Listening {
                addr: endpoint.local_addr(),
            });

            let (stream, peer) = match endpoint.accept().await {
                Ok(accepted) => accepted,
                Err(e) if self.is_cancelled() => {
                    log::debug!("Accept interrupted by stop: {e}");
                    return Ok(());
                }
                Err(e) => {
                    log::error!("Accept failed: {e}");
                    return Err(ReceiveFailure::Accept);
                }
            };

            self.set_state(SessionState::Transferring);
            log::info!("Peer accepted: {peer}");
            self.emit(ServerEvent::PeerAccepted { peer });

            let artifact = &self.config.artifact_path;
            let bytes = match receive_payload(stream, artifact).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("Transfer from {peer} failed: {e}");
                    return Err(ReceiveFailure::Stream);
                }
            };
            log::info!("Received {bytes} bytes from {peer}");

            let preview = match load_preview_async(artifact).await {
                Ok(preview) => Some(preview),
                Err(e) => {
                    log::debug!("No preview for {}: {e}", artifact.display());
                    None
                }
            };

            self.emit(ServerEvent::TransferComplete {
                artifact: artifact.clone(),
                bytes,
                preview,
            });
        }
    }

    /// Publish the terminal state and its event
    fn finish(&self, outcome: Result<(), ReceiveFailure>) -> SessionState {
        match outcome {
            Ok(()) => {
                log::info!("Server session stopped");
                self.set_state(SessionState::Stopped);
                self.emit(ServerEvent::Stopped);
                SessionState::Stopped
            }
            Err(kind) => {
                log::warn!("Server session failed: {kind}");
                self.set_state(SessionState::Failed);
                self.emit(ServerEvent::TransferError { kind });
                SessionState::Failed
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn set_endpoint(&self, closer: Option<EndpointCloser>) {
        *self
            .endpoint_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = closer;
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn emit(&self, event: ServerEvent) {
        // The observer may have stopped listening; the session carries on
        let _ = self.events.send(event);
    }
}

/// Drain one peer's stream into the artifact
///
/// Reads until the peer closes its write side. The artifact is flushed and
/// closed, and the connection dropped, before this returns.
async fn receive_payload(mut stream: TcpStream, artifact: &Path) -> io::Result<u64> {
    let mut file = open_artifact(artifact).await?;
    let bytes = copy_stream(&mut stream, &mut file).await?;
    file.sync_all().await?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    async fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        (client.unwrap(), accepted.unwrap().0)
    }

    #[tokio::test]
    async fn test_receive_payload_until_peer_closes() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("out.bin");
        let (mut client, server) = connected_pair().await;

        let writer = tokio::spawn(async move {
            client.write_all(b"hello").await.unwrap();
            client.shutdown().await.unwrap();
        });

        let bytes = receive_payload(server, &artifact).await.unwrap();
        writer.await.unwrap();

        assert_eq!(bytes, 5);
        assert_eq!(std::fs::read(&artifact).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_receive_empty_payload_truncates() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("out.bin");
        std::fs::write(&artifact, b"stale").unwrap();
        let (client, server) = connected_pair().await;
        drop(client);

        let bytes = receive_payload(server, &artifact).await.unwrap();

        assert_eq!(bytes, 0);
        assert!(std::fs::read(&artifact).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receive_into_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("missing/out.bin");
        let (_client, server) = connected_pair().await;

        assert!(receive_payload(server, &artifact).await.is_err());
    }
}
