//! Composition root for the control panel host.
//!
//! Builds the shared state, connects the bridge around the dispatcher,
//! installs the five UI surfaces, and runs until interrupted or until a
//! panel asks the window to close.

use anyhow::Context;
use clap::Parser;
use gangway_bridge::{
    channel, connect_with_registry, BackendSetupSurface, DebugConsoleSurface, DownloaderSurface,
    EventRegistry, EventSink, InterpreterSurface, SuperuserSurface, SurfaceRegistry,
};
use gangway_shell::backend::{LineSink, OutputStream};
use gangway_shell::{ShellDispatcher, ShellState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gangway-shell", version, about = "Gangway control panel host")]
struct Args {
    /// Install root. Defaults to the platform data directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Backend server command to supervise, e.g. "python manage.py runserver".
    #[arg(long)]
    backend_command: Option<String>,

    /// Worker command to supervise alongside the backend.
    #[arg(long)]
    worker_command: Option<String>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let root = args.root.unwrap_or_else(default_root);
    tokio::fs::create_dir_all(&root)
        .await
        .with_context(|| format!("creating install root {}", root.display()))?;
    info!("install root: {}", root.display());

    let events = Arc::new(EventRegistry::new());
    let sink = EventSink::new(events.clone());
    let state = Arc::new(ShellState::new(root, sink)?);

    if let Some(command) = &args.backend_command {
        start_supervised(&state, command, Process::Backend).await?;
    }
    if let Some(command) = &args.worker_command {
        start_supervised(&state, command, Process::Worker).await?;
    }

    let dispatch = Arc::new(ShellDispatcher::new(state.clone()));
    let pair = connect_with_registry(dispatch, events);

    let mut registry = SurfaceRegistry::new();
    registry.install_backend_setup(BackendSetupSurface::new(
        pair.dispatcher.clone(),
        pair.events.clone(),
    ))?;
    registry.install_debug_console(DebugConsoleSurface::new(
        pair.dispatcher.clone(),
        pair.events.clone(),
    ))?;
    registry.install_downloader(DownloaderSurface::new(
        pair.dispatcher.clone(),
        pair.events.clone(),
    ))?;
    registry.install_interpreter(InterpreterSurface::new(
        pair.dispatcher.clone(),
        pair.events.clone(),
    ))?;
    registry.install_superuser(SuperuserSurface::new(
        pair.dispatcher.clone(),
        pair.events.clone(),
    ))?;
    let surfaces = registry.seal();
    info!(
        "surfaces installed: {}",
        surfaces.names().collect::<Vec<_>>().join(", ")
    );

    state.refresh_install_state().await;

    let mut close = state.close_requested();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
        _ = close.changed() => info!("window close requested, shutting down"),
    }

    state.backend_process.stop().await?;
    state.worker_process.stop().await?;
    pair.close();
    Ok(())
}

#[derive(Clone, Copy)]
enum Process {
    Backend,
    Worker,
}

/// Spawn a supervised child and route its output into the debug console and
/// the matching output event channel. Both pipes go to the same channel; the
/// stream split only matters for local logging.
async fn start_supervised(
    state: &Arc<ShellState>,
    command: &str,
    which: Process,
) -> anyhow::Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .context("supervised command must not be empty")?
        .to_string();
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(parts).current_dir(state.backend_dir());

    let sink_state = state.clone();
    let line_sink: LineSink = Arc::new(move |_stream: OutputStream, line| {
        match which {
            Process::Backend => {
                sink_state.console.record_backend(&line);
                sink_state.sink.publish(channel::BACKEND_OUTPUT, &line);
            }
            Process::Worker => {
                sink_state.console.record_worker(&line);
                sink_state.sink.publish(channel::WORKER_OUTPUT, &line);
            }
        };
    });

    let supervisor = match which {
        Process::Backend => &state.backend_process,
        Process::Worker => &state.worker_process,
    };
    supervisor.start(cmd, line_sink).await?;
    Ok(())
}

fn default_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("gangway"))
        .unwrap_or_else(|| PathBuf::from(".gangway"))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
