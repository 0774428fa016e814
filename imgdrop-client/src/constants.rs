//! Application-wide constants
//!
//! User-facing status lines and error messages for the `imgdrop` binary.

pub const MSG_SELECTED: &str = "Selected image: ";
pub const MSG_NOT_AN_IMAGE: &str = "Warning: file is not a decodable image, sending raw bytes";
pub const MSG_SENDING: &str = "Sending image to ";
pub const MSG_SENT: &str = "Image sent";
pub const MSG_NOT_SENT: &str = "Image not sent";
pub const MSG_NO_NETWORK: &str = "Warning: no network route found, trying anyway";

pub const ERR_GENERIC: &str = "Error: ";
pub const ERR_EMPTY_HOST: &str = "enter the receiver's IP address or host name";
pub const ERR_NO_SOURCE: &str = "select an image to send";
pub const ERR_SOURCE_NOT_FOUND: &str = "file not found: ";
pub const ERR_SOURCE_NOT_FILE: &str = "not a regular file: ";
