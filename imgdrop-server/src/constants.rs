//! Server-wide constants
//!
//! User-facing status lines and error messages, plus storage names.

// =============================================================================
// Storage
// =============================================================================

/// Data directory name (under the platform data directory)
pub const DATA_DIR_NAME: &str = "imgdropd";

// =============================================================================
// Networking
// =============================================================================

/// Exit status after a forced shutdown (128 + SIGINT)
pub const EXIT_INTERRUPTED: i32 = 130;

/// Pending-connection backlog for the listening endpoint
///
/// Peers are served one at a time, so extra peers simply wait in the kernel.
pub const LISTEN_BACKLOG: i32 = 1;

// =============================================================================
// Status Messages
// =============================================================================

pub const MSG_BANNER: &str = "imgdropd v";
pub const MSG_ARTIFACT: &str = "Received images are stored at: ";
pub const MSG_LISTENING: &str = "Listening on ";
pub const MSG_PEER_ACCEPTED: &str = "Receiving image from ";
pub const MSG_IMAGE_RECEIVED: &str = "Image received: ";
pub const MSG_NOT_AN_IMAGE: &str = " (payload is not a decodable image)";
pub const MSG_SERVER_STOPPED: &str = "Server stopped";
pub const MSG_NO_NETWORK: &str =
    "Warning: no network route found, only peers that can still reach this machine will connect";
pub const MSG_SHUTDOWN_RECEIVED: &str =
    "Shutdown signal received, stopping server (signal again to exit now)...";
pub const MSG_FORCED_EXIT: &str = "Second shutdown signal received, exiting without waiting";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_GENERIC: &str = "Error: ";
pub const ERR_SERVER: &str = "Server error: ";
pub const ERR_NO_DATA_DIR: &str = "could not determine the platform data directory";
pub const ERR_CREATE_DATA_DIR: &str = "failed to create data directory ";
pub const ERR_ENDPOINT_CLOSED: &str = "listening endpoint closed";
pub const ERR_SIGNAL_SIGTERM: &str = "Failed to install SIGTERM handler";
pub const ERR_SIGNAL_SIGINT: &str = "Failed to install SIGINT handler";
pub const ERR_SIGNAL_CTRLC: &str = "Failed to listen for Ctrl+C";
