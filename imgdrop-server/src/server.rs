//! Lifecycle and cancellation of a receiver session
//!
//! [`ServerHandle::start`] runs one session on its own task. The handle keeps
//! only what a stop needs: the cancellation flag and the closer of the
//! endpoint while it is bound. It never touches a peer or the artifact.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use imgdrop_common::{ARTIFACT_FILE_NAME, DEFAULT_PORT, ServerEvent, SessionState};
use tokio::sync::{mpsc, watch};

use crate::receiver::{EndpointSlot, Session};
use crate::storage::default_artifact_path;

/// Configuration for one receiver session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: IpAddr,
    /// Port shared with senders (0 picks an ephemeral port)
    pub port: u16,
    /// Where each received payload is written
    pub artifact_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            artifact_path: default_artifact_path()
                .unwrap_or_else(|_| PathBuf::from(ARTIFACT_FILE_NAME)),
        }
    }
}

/// Handle to a running receiver session
///
/// Each handle owns exactly one session; once it reaches `Stopped` or
/// `Failed`, start a new handle for a new session. Dropping the handle stops
/// the session.
#[derive(Debug)]
pub struct ServerHandle {
    cancelled: Arc<AtomicBool>,
    endpoint: EndpointSlot,
    state: watch::Receiver<SessionState>,
}

impl ServerHandle {
    /// Start a new session on its own task
    ///
    /// Events are sent on `events` in the order they happen. Must be called
    /// from within a tokio runtime.
    pub fn start(config: ServerConfig, events: mpsc::UnboundedSender<ServerEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let endpoint: EndpointSlot = Arc::new(Mutex::new(None));
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        let session = Session {
            config,
            cancelled: cancelled.clone(),
            endpoint_slot: endpoint.clone(),
            events,
            state: state_tx,
        };
        tokio::spawn(session.run());

        Self {
            cancelled,
            endpoint,
            state: state_rx,
        }
    }

    /// Request the session to stop
    ///
    /// Raises the cancellation flag, then closes the endpoint if one is
    /// bound. A pending accept wakes up and the session ends `Stopped`. A
    /// transfer already in progress runs to completion first. Calling this
    /// more than once is harmless.
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);

        let endpoint = self
            .endpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(closer) = endpoint.as_ref() {
            log::debug!("Closing listening endpoint");
            closer.close();
        }
    }

    /// Returns true once `stop()` has been called
    pub fn is_stop_requested(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the session reaches `Stopped` or `Failed`
    pub async fn wait(&self) -> SessionState {
        let mut state = self.state.clone();
        match state.wait_for(SessionState::is_terminal).await {
            Ok(terminal) => *terminal,
            // The session task is gone without publishing a terminal state
            Err(_) => SessionState::Failed,
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgdrop_common::ReceiveFailure;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::time::timeout;

    fn test_config(temp: &TempDir) -> ServerConfig {
        ServerConfig {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            artifact_path: temp.path().join(ARTIFACT_FILE_NAME),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.bind.is_unspecified());
        assert!(config.artifact_path.ends_with(ARTIFACT_FILE_NAME));
    }

    #[tokio::test]
    async fn test_stop_while_listening() {
        let temp = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let server = ServerHandle::start(test_config(&temp), tx);

        assert!(matches!(rx.recv().await, Some(ServerEvent::Listening { .. })));
        assert_eq!(server.state(), SessionState::Listening);

        server.stop();
        let state = timeout(Duration::from_secs(5), server.wait())
            .await
            .unwrap();

        assert_eq!(state, SessionState::Stopped);
        assert!(matches!(rx.recv().await, Some(ServerEvent::Stopped)));
        assert!(rx.recv().await.is_none());
        assert!(server.is_stop_requested());
    }

    #[tokio::test]
    async fn test_stop_before_bind_is_still_honoured() {
        let temp = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let server = ServerHandle::start(test_config(&temp), tx);

        // The session task has not run yet, so no endpoint is registered
        server.stop();
        let state = timeout(Duration::from_secs(5), server.wait())
            .await
            .unwrap();

        assert_eq!(state, SessionState::Stopped);
        assert!(matches!(rx.recv().await, Some(ServerEvent::Stopped)));
    }

    #[tokio::test]
    async fn test_stop_twice_is_harmless() {
        let temp = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let server = ServerHandle::start(test_config(&temp), tx);

        server.stop();
        server.stop();

        let state = timeout(Duration::from_secs(5), server.wait())
            .await
            .unwrap();
        assert_eq!(state, SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_bind_failure_ends_failed() {
        let temp = TempDir::new().unwrap();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let first = ServerHandle::start(test_config(&temp), tx1);
        let addr = match rx1.recv().await {
            Some(ServerEvent::Listening { addr }) => addr,
            other => panic!("expected Listening, got {other:?}"),
        };

        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let mut config = test_config(&temp);
        config.port = addr.port();
        let second = ServerHandle::start(config, tx2);

        let state = timeout(Duration::from_secs(5), second.wait())
            .await
            .unwrap();
        assert_eq!(state, SessionState::Failed);
        assert!(matches!(
            rx2.recv().await,
            Some(ServerEvent::TransferError {
                kind: ReceiveFailure::Bind
            })
        ));
        assert!(rx2.recv().await.is_none());

        // The failed session never touched the first one
        assert_eq!(first.state(), SessionState::Listening);
        first.stop();
        assert_eq!(first.wait().await, SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_drop_stops_session() {
        let temp = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let server = ServerHandle::start(test_config(&temp), tx);
        assert!(matches!(rx.recv().await, Some(ServerEvent::Listening { .. })));

        drop(server);

        let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert!(matches!(event, Some(ServerEvent::Stopped)));
    }

    #[tokio::test]
    async fn test_endpoint_closed_without_stop_fails() {
        let temp = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let server = ServerHandle::start(test_config(&temp), tx);
        assert!(matches!(rx.recv().await, Some(ServerEvent::Listening { .. })));

        // Close the endpoint without raising the cancellation flag
        server
            .endpoint
            .lock()
            .unwrap()
            .as_ref()
            .expect("endpoint registered while listening")
            .close();

        let state = timeout(Duration::from_secs(5), server.wait())
            .await
            .unwrap();
        assert_eq!(state, SessionState::Failed);
        assert!(matches!(
            rx.recv().await,
            Some(ServerEvent::TransferError {
                kind: ReceiveFailure::Accept
            })
        ));
        assert!(rx.recv().await.is_none());
        assert!(!server.is_stop_requested());
    }

    #[tokio::test]
    async fn test_stream_error_ends_session() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(&temp);
        config.artifact_path = temp.path().join("missing").join(ARTIFACT_FILE_NAME);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let server = ServerHandle::start(config, tx);
        let addr = match rx.recv().await {
            Some(ServerEvent::Listening { addr }) => addr,
            other => panic!("expected Listening, got {other:?}"),
        };

        // The receiver may drop the connection before these complete
        let mut peer = TcpStream::connect(addr).await.unwrap();
        let _ = peer.write_all(b"hello").await;
        let _ = peer.shutdown().await;

        let state = timeout(Duration::from_secs(5), server.wait())
            .await
            .unwrap();
        assert_eq!(state, SessionState::Failed);
        assert!(matches!(rx.recv().await, Some(ServerEvent::PeerAccepted { .. })));
        assert!(matches!(
            rx.recv().await,
            Some(ServerEvent::TransferError {
                kind: ReceiveFailure::Stream
            })
        ));
        assert!(rx.recv().await.is_none());

        // The whole session is over, not just the one transfer
        assert!(TcpStream::connect(addr).await.is_err());
    }
}
