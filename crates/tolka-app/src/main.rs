use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod controller;
mod events;
mod io;
mod runtime;
mod state;
#[cfg(test)]
mod tests;

use tolka_capture::XcapScreens;
use tolka_config::Config;
use tolka_download::{DownloadOptions, DownloadSet, Downloader};
use tolka_events::EventBus;
use tolka_ocr::{ModelStore, OcrsRecognizer};
use tolka_translate::GoogleTranslator;

use self::controller::AppController;
use self::runtime::{OverlayRuntime, RuntimeDeps};
use self::state::AppState;

/// Screen-overlay translator backend.
#[derive(Parser, Debug)]
#[command(name = "tolka", version, about)]
struct Args {
    /// Config file path (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "tolka_download=trace"
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    config.validate()?;

    let bus = EventBus::default();
    let downloads = Arc::new(DownloadSet::new());

    // Model bootstrap comes first: without the OCR models nothing else can
    // run. A StopDownload during this phase aborts startup, like closing
    // the download window does in the UI.
    let store = ModelStore::new(
        ModelStore::default_dir().context("no config directory on this platform")?,
    );
    let downloader = Arc::new(Downloader::new(bus.clone(), DownloadOptions::default())?);
    if bootstrap::ensure_models(&store, downloader, downloads.clone(), &bus).await? {
        tracing::info!("model download complete");
    }

    let deps = RuntimeDeps {
        screens: Arc::new(XcapScreens),
        recognizer: Arc::new(OcrsRecognizer::from_store(&store)?),
        translator: Arc::new(GoogleTranslator::new()?),
    };

    let runtime = Arc::new(OverlayRuntime::new(config.interval));
    let state = Arc::new(AppState::new(config, config_path));
    let controller = AppController::new(state, bus, runtime, downloads);
    let mut tasks = controller.spawn_tasks(deps);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            controller.shutdown();
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::warn!("task exited"),
                Some(Ok(Err(e))) => tracing::error!("task failed: {e:#}"),
                Some(Err(e)) => tracing::error!("task panicked: {e}"),
                None => {}
            }
            controller.shutdown();
        }
    }

    Ok(())
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // Pretty output for a terminal, JSON when piped into something.
    if atty::is(atty::Stream::Stdout) {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    }
}
