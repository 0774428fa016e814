//! Command-line argument parsing

use clap::Parser;
use imgdrop_common::DEFAULT_PORT;
use std::net::IpAddr;
use std::path::PathBuf;

/// Get default artifact path help text for current platform
fn default_output_help() -> String {
    #[cfg(target_os = "linux")]
    return "Received image path (default: ~/.local/share/imgdropd/file_received.png)".to_string();

    #[cfg(target_os = "macos")]
    return "Received image path (default: ~/Library/Application Support/imgdropd/file_received.png)"
        .to_string();

    #[cfg(target_os = "windows")]
    return "Received image path (default: %APPDATA%\\imgdropd\\file_received.png)".to_string();

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    return "Received image path (overrides platform default)".to_string();
}

/// imgdrop image receiver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IP address to bind to (IPv4 or IPv6)
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on (senders must use the same port)
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Received image path (overrides platform default)
    #[arg(short, long, help = default_output_help())]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}
