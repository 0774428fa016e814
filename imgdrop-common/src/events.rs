//! Observer events emitted by the receiver and sender
//!
//! Background tasks never hold a reference to whoever is watching them. They
//! only own the send half of an unbounded channel; the caller keeps the
//! receive half and decides for itself how long to keep listening. Sends on a
//! closed channel are ignored.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use uuid::Uuid;

use crate::preview::Preview;

// =============================================================================
// Session State
// =============================================================================

/// State of one receiver session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet bound
    Idle,
    /// Bound and waiting for the next peer
    Listening,
    /// A peer was accepted and its stream is being drained to storage
    Transferring,
    /// Stopped on request (terminal)
    Stopped,
    /// Ended by a bind, accept or stream failure (terminal)
    Failed,
}

impl SessionState {
    /// Returns true once the session can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Stopped | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Listening => "listening",
            SessionState::Transferring => "transferring",
            SessionState::Stopped => "stopped",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Failure Categories
// =============================================================================

/// Coarse category of a receiver failure
///
/// Only the category crosses the core boundary; the underlying I/O error is
/// logged where it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveFailure {
    /// The port could not be bound
    Bind,
    /// Waiting for a peer failed without a stop request
    Accept,
    /// Reading the socket or writing the artifact failed
    Stream,
}

impl fmt::Display for ReceiveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiveFailure::Bind => write!(f, "could not bind the listening port"),
            ReceiveFailure::Accept => write!(f, "failed while waiting for a peer"),
            ReceiveFailure::Stream => write!(f, "failed while receiving the image"),
        }
    }
}

impl std::error::Error for ReceiveFailure {}

// =============================================================================
// Receiver Events
// =============================================================================

/// Event sent from the receiver loop to its observer
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// The endpoint is bound and waiting for the next peer
    Listening { addr: SocketAddr },

    /// A peer connected; its payload is about to be drained
    PeerAccepted { peer: SocketAddr },

    /// A payload was fully persisted
    ///
    /// `preview` is `None` when the payload does not decode as an image.
    TransferComplete {
        artifact: PathBuf,
        bytes: u64,
        preview: Option<Preview>,
    },

    /// The session failed and will not accept further peers
    TransferError { kind: ReceiveFailure },

    /// The session was stopped on request and the endpoint is closed
    Stopped,
}

// =============================================================================
// Sender Events
// =============================================================================

/// Event sent from one sender invocation to its observer
///
/// `id` identifies the invocation, so several concurrent sends can share one
/// observer channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendEvent {
    /// The send is about to connect
    SendingStarted { id: Uuid, destination: String },

    /// Every byte was written and the connection closed cleanly
    SendSucceeded { id: Uuid, bytes: u64 },

    /// Resolution, connection, read or write failed
    SendFailed { id: Uuid },
}

impl SendEvent {
    /// Returns true for the final event of an invocation
    pub fn is_outcome(&self) -> bool {
        !matches!(self, SendEvent::SendingStarted { .. })
    }
}
