//! imgdrop Server Library
//!
//! The receiving side of imgdrop: a listening endpoint that can be closed
//! from another task, the receiver loop that drains one peer at a time into
//! a fixed artifact file, and the handle that starts and stops a session.
//!
//! This library also backs the `imgdropd` binary and the integration tests.

pub mod constants;
pub mod endpoint;
mod receiver;
pub mod server;
pub mod storage;

pub use server::{ServerConfig, ServerHandle};
