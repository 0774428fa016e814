//! Command-line argument parsing

use clap::Parser;
use imgdrop_common::DEFAULT_PORT;
use std::path::PathBuf;

/// imgdrop image sender
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Receiver IP address or host name
    pub host: String,

    /// Image file to send
    pub file: PathBuf,

    /// Receiver port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_args() {
        let args = Args::parse_from(["imgdrop", "192.168.1.20", "photo.png"]);
        assert_eq!(args.host, "192.168.1.20");
        assert_eq!(args.file, PathBuf::from("photo.png"));
        assert_eq!(args.port, DEFAULT_PORT);
        assert!(!args.debug);
    }

    #[test]
    fn test_port_and_debug() {
        let args = Args::parse_from(["imgdrop", "-p", "7000", "--debug", "host", "a.png"]);
        assert_eq!(args.port, 7000);
        assert!(args.debug);
    }

    #[test]
    fn test_requires_file() {
        assert!(Args::try_parse_from(["imgdrop", "host"]).is_err());
    }
}
