use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use version_watcher::config::{WatcherConfig, config_path};
use version_watcher::logging::init_logging;
use version_watcher::watcher::Watcher;

#[derive(Parser)]
#[command(name = "version-watcher")]
#[command(version, about = "Tracks advertised game server versions from a public server listing")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Keep the version cache refreshed until interrupted (default)
    Run,
    /// Look up the advertised version of a single server
    Lookup { host: String },
    /// Run one refresh pass and report what was found
    Scan,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(config_path);
    let loaded = WatcherConfig::load(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();
    let _guard = init_logging(&config.logging)?;
    if !found {
        info!("{:?} does not exist, using default config", path);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => runtime.block_on(run(config)),
        Command::Lookup { host } => runtime.block_on(lookup(config, &host)),
        Command::Scan => runtime.block_on(scan(config)),
    }
}

async fn run(config: WatcherConfig) -> anyhow::Result<()> {
    let watcher = Watcher::new(&config)?;
    let cancel = CancellationToken::new();
    let handle = watcher.start(cancel.clone(), config.refresh_interval())?;

    shutdown_signal().await?;
    info!("Shutdown requested, waiting for refresh task");
    cancel.cancel();
    handle.await?;

    Ok(())
}

async fn lookup(config: WatcherConfig, host: &str) -> anyhow::Result<()> {
    let watcher = Watcher::new(&config)?;
    let version = watcher.version_by_server(host).await?;
    println!("{}", version);
    Ok(())
}

async fn scan(config: WatcherConfig) -> anyhow::Result<()> {
    let watcher = Watcher::new(&config)?;
    let summary = watcher.refresh_once(&CancellationToken::new()).await?;
    println!(
        "pages: {} (failed: {}), servers cached: {}",
        summary.pages_total,
        summary.pages_failed,
        watcher.cache().len()
    );
    Ok(())
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
