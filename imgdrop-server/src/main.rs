//! imgdrop receiver daemon

mod args;

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use imgdrop_common::{ServerEvent, SessionState, net};
use imgdrop_server::constants::*;
use imgdrop_server::storage::{default_artifact_path, prepare_artifact_dir};
use imgdrop_server::{ServerConfig, ServerHandle};

use args::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(args.debug);

    // Print banner first
    println!("{}{}", MSG_BANNER, env!("CARGO_PKG_VERSION"));

    // Peers on a gateway-less LAN can still reach us, so only warn
    if net::should_warn_offline(args.bind.is_loopback()) {
        eprintln!("{}", MSG_NO_NETWORK);
    }

    let artifact_path = setup_artifact_path(args.output);

    let config = ServerConfig {
        bind: args.bind,
        port: args.port,
        artifact_path,
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let server = ServerHandle::start(config, event_tx);

    // Setup graceful shutdown handling
    let mut shutdown = ShutdownSignal::install();
    let mut stopping = false;

    // The channel closes once the session task has finished
    loop {
        tokio::select! {
            _ = shutdown.recv() => match signal_action(stopping) {
                SignalAction::Stop => {
                    println!("{}", MSG_SHUTDOWN_RECEIVED);
                    server.stop();
                    stopping = true;
                }
                // A peer that never closes keeps the session alive
                SignalAction::ForceExit => {
                    eprintln!("{}", MSG_FORCED_EXIT);
                    std::process::exit(EXIT_INTERRUPTED);
                }
            },
            event = event_rx.recv() => match event {
                Some(event) => report_event(event),
                None => break,
            },
        }
    }

    if server.wait().await == SessionState::Failed {
        std::process::exit(1);
    }
}

/// Install the logger; `--debug` lowers the default filter to debug
fn setup_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Resolve the artifact path and make sure its directory exists
fn setup_artifact_path(output: Option<PathBuf>) -> PathBuf {
    let path = output.unwrap_or_else(|| match default_artifact_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}{}", ERR_GENERIC, e);
            std::process::exit(1);
        }
    });

    if let Err(e) = prepare_artifact_dir(&path) {
        eprintln!("{}{}", ERR_GENERIC, e);
        std::process::exit(1);
    }

    println!("{}{}", MSG_ARTIFACT, path.display());
    path
}

/// Print one session event for the user
fn report_event(event: ServerEvent) {
    match event {
        ServerEvent::Listening { addr } => {
            println!("{}{}", MSG_LISTENING, net::display_addr(addr));
        }
        ServerEvent::PeerAccepted { peer } => {
            println!("{}{}", MSG_PEER_ACCEPTED, peer);
        }
        ServerEvent::TransferComplete {
            artifact,
            bytes,
            preview,
        } => match preview {
            Some(preview) => println!(
                "{}{} ({} bytes, {}x{}, preview {}x{})",
                MSG_IMAGE_RECEIVED,
                artifact.display(),
                bytes,
                preview.source_width,
                preview.source_height,
                preview.width,
                preview.height
            ),
            None => println!(
                "{}{} ({} bytes){}",
                MSG_IMAGE_RECEIVED,
                artifact.display(),
                bytes,
                MSG_NOT_AN_IMAGE
            ),
        },
        ServerEvent::TransferError { kind } => {
            eprintln!("{}{}", ERR_SERVER, kind);
        }
        ServerEvent::Stopped => {
            println!("{}", MSG_SERVER_STOPPED);
        }
    }
}

/// What a shutdown signal does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// Ask the session to stop and wait for it
    Stop,
    /// A stop is already pending; leave immediately
    ForceExit,
}

fn signal_action(stopping: bool) -> SignalAction {
    if stopping {
        SignalAction::ForceExit
    } else {
        SignalAction::Stop
    }
}

/// Graceful shutdown signal handling (SIGTERM/SIGINT, Ctrl+C elsewhere)
///
/// Installed once and awaited repeatedly, so later signals are still seen.
struct ShutdownSignal {
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    fn install() -> Self {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            Self {
                sigterm: signal(SignalKind::terminate()).expect(ERR_SIGNAL_SIGTERM),
                sigint: signal(SignalKind::interrupt()).expect(ERR_SIGNAL_SIGINT),
            }
        }

        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.sigterm.recv() => {},
                _ = self.sigint.recv() => {},
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.expect(ERR_SIGNAL_CTRLC);
        }
    }
}
