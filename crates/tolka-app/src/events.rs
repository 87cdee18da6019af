use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tolka_download::DownloadSet;
use tolka_events::{AppEvent, EventBus, Subscription};

use crate::runtime::{OverlayRuntime, RuntimeDeps};
use crate::state::AppState;

/// Backend side of the event channels.
///
/// The subscription is created by the caller before any task runs so the
/// first emissions cannot be missed.
pub async fn event_loop(
    state: Arc<AppState>,
    runtime: Arc<OverlayRuntime>,
    deps: RuntimeDeps,
    downloads: Arc<DownloadSet>,
    bus: EventBus,
    mut sub: Subscription,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            event = sub.recv() => {
                let Some(event) = event else { return Ok(()) };
                handle_event(&state, &runtime, &deps, &downloads, &bus, &shutdown, event).await;
            }
        }
    }
}

async fn handle_event(
    state: &Arc<AppState>,
    runtime: &Arc<OverlayRuntime>,
    deps: &RuntimeDeps,
    downloads: &Arc<DownloadSet>,
    bus: &EventBus,
    shutdown: &CancellationToken,
    event: AppEvent,
) {
    match event {
        AppEvent::StopDownload { file } => {
            let cancelled = downloads.cancel(file.as_deref());
            tracing::info!(?file, cancelled, "stop download requested");
            // A blanket stop means the user closed the download window;
            // without models there is nothing left to run.
            if file.is_none() {
                shutdown.cancel();
            }
        }
        AppEvent::RefreshOverlay => {
            restart_runtime(state, runtime, deps, bus).await;
        }
        AppEvent::OnOffConfigTrayItem(enabled) => {
            // Tray menu state belongs to the UI host; nothing to do here.
            tracing::debug!(enabled, "tray item toggle");
        }
        AppEvent::NewTranslatedText(_) | AppEvent::DownloadProgress(_) => {
            // UI-only events, ignore in backend.
        }
    }
}

/// Re-read the config and bring the capture loop in line with it: stopped
/// while no usable region is set, running against the current
/// monitor/region/language otherwise.
async fn restart_runtime(
    state: &Arc<AppState>,
    runtime: &Arc<OverlayRuntime>,
    deps: &RuntimeDeps,
    bus: &EventBus,
) {
    let (region, monitor, lang, interval) = {
        let config = state.config.read().await;
        (config.region, config.monitor, config.lang.clone(), config.interval)
    };

    runtime.stop();
    runtime.update(interval);

    match region {
        Some(region) if region.is_valid() => {
            runtime.start(deps.clone(), monitor, region, lang, bus.clone());
        }
        Some(_) => tracing::warn!("configured region is degenerate, overlay stays down"),
        None => tracing::info!("no capture region configured, overlay stays down"),
    }
}
