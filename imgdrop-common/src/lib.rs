//! imgdrop Common Library
//!
//! Shared types and utilities for the imgdrop receiver (`imgdropd`) and
//! sender (`imgdrop`).
//!
//! The wire protocol is deliberately bare: a sender opens one TCP connection
//! to the receiver's port, writes the raw bytes of a file and closes the
//! connection. There is no handshake, header, length field or checksum; the
//! payload is framed only by the sender closing its side of the stream.

pub mod events;
pub mod io;
pub mod net;
pub mod preview;

pub use events::{ReceiveFailure, SendEvent, ServerEvent, SessionState};

/// Default port shared by the receiver and the sender
pub const DEFAULT_PORT: u16 = 9999;

/// Chunk size for every stream copy (socket to file, file to socket)
///
/// This is an implementation detail, not part of the protocol: any chunk size
/// is conformant as long as all bytes are written in order.
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Largest preview dimension (pixels) the down-sampling aims for
pub const PREVIEW_MAX_DIMENSION: u32 = 200;

/// File name of the received artifact inside the receiver's data directory
pub const ARTIFACT_FILE_NAME: &str = "file_received.png";
