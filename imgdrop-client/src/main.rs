//! imgdrop sender

mod args;

use clap::Parser;
use tokio::sync::mpsc;

use imgdrop_client::constants::*;
use imgdrop_client::{SendRequest, spawn_send};
use imgdrop_common::preview::load_preview_async;
use imgdrop_common::{SendEvent, net};

use args::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(args.debug);

    let request = match SendRequest::new(&args.host, args.port, &args.file) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{}{}", ERR_GENERIC, e);
            std::process::exit(1);
        }
    };

    if net::should_warn_offline(net::is_loopback_host(request.host())) {
        eprintln!("{}", MSG_NO_NETWORK);
    }

    // Show what is about to go out; non-images are still sent as-is
    match load_preview_async(request.source()).await {
        Ok(preview) => println!(
            "{}{} ({}x{}, preview {}x{})",
            MSG_SELECTED,
            request.source().display(),
            preview.source_width,
            preview.source_height,
            preview.width,
            preview.height
        ),
        Err(e) => {
            log::debug!("Preview of {} failed: {e}", request.source().display());
            println!("{}{}", MSG_SELECTED, request.source().display());
            println!("{}", MSG_NOT_AN_IMAGE);
        }
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (_id, handle) = spawn_send(request, event_tx);

    while let Some(event) = event_rx.recv().await {
        let done = event.is_outcome();
        match event {
            SendEvent::SendingStarted { destination, .. } => {
                println!("{}{}", MSG_SENDING, destination);
            }
            SendEvent::SendSucceeded { bytes, .. } => {
                println!("{} ({} bytes)", MSG_SENT, bytes);
            }
            SendEvent::SendFailed { .. } => {
                eprintln!("{}", MSG_NOT_SENT);
            }
        }
        if done {
            break;
        }
    }

    let sent = handle.await.unwrap_or(false);
    if !sent {
        std::process::exit(1);
    }
}

/// Install the logger; `--debug` lowers the default filter to debug
fn setup_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
