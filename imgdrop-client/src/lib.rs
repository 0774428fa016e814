//! imgdrop Sender Library
//!
//! Validates a send request and pushes one file to a receiver over a fresh
//! TCP connection. Used by the `imgdrop` binary and by the receiver's
//! integration tests.

pub mod constants;
pub mod request;
pub mod sender;

pub use request::{RequestError, SendRequest};
pub use sender::{SendError, send_image, spawn_send};
