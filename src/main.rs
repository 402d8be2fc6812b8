//! # netscope - Main Entry Point
//!
//! Wires the pipeline together: resolves the capture interface, opens the
//! datalink channel (the one fatal startup step), spawns the capture thread,
//! and serves viewers on the configured address.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;

use netscope::broadcast::Broadcaster;
use netscope::cli::Args;
use netscope::domain::{EventIdGen, PipelineConfig};
use netscope::capture;
use netscope::server::{self, AppState};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOPERM: i32 = 77;

fn main() {
    let args = Args::parse();
    init_logging(args.quiet);
    std::process::exit(match run(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    });
}

/// Lifecycle output is info-level; `--quiet` raises the default filter so
/// only warnings and errors come through. `RUST_LOG` still overrides.
fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    // Opening a raw capture socket needs CAP_NET_RAW; surface that as the
    // conventional "no permission" code so wrappers can suggest sudo.
    let msg = format!("{err:#}").to_lowercase();
    if msg.contains("permission denied") || msg.contains("operation not permitted") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run(args: Args) -> Result<()> {
    info!("netscope: network capture backend starting");

    let interface = capture::resolve_interface(args.interface.as_deref())?;
    let channel = capture::open_channel(&interface)
        .with_context(|| format!("failed to open capture interface {}", interface.name))?;
    info!("capturing on interface {}", interface.name);

    let config = Arc::new(PipelineConfig::new(args.delay));
    let ids = Arc::new(EventIdGen::new());
    let broadcaster = Arc::new(Broadcaster::new());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    // Capture domain: a dedicated OS thread, since datalink reads block
    // for unbounded durations.
    {
        let config = Arc::clone(&config);
        std::thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || capture::capture_loop(channel, config, ids, event_tx))
            .context("failed to spawn capture thread")?;
    }

    // Serving domain: drain the handoff channel and fan out.
    {
        let broadcaster = Arc::clone(&broadcaster);
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                broadcaster.publish(Arc::new(event));
            }
        });
    }

    let state = AppState {
        broadcaster,
        config,
        interface: Arc::new(interface),
    };
    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("listening on {}", args.listen);
    axum::serve(listener, app).await?;
    Ok(())
}
