use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;
use tolka_config::Config;
use tolka_events::{AppEvent, EventBus};

use crate::runtime::OverlayRuntime;
use crate::state::AppState;

/// Watch the config file for edits (the settings window and hand editing
/// both write it) and apply changes: store the new config, retune the
/// capture interval, and tell the overlay to refresh.
pub async fn watcher_io(
    state: Arc<AppState>,
    delta_time: Duration,
    cancel: CancellationToken,
    bus: EventBus,
    runtime: Arc<OverlayRuntime>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(delta_time);
    let mut last_seen = modified_at(&state).await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("config watcher stopping");
                return Ok(());
            }
            _ = interval.tick() => {
                let Some(modified) = modified_at(&state).await else { continue };
                if last_seen == Some(modified) {
                    continue;
                }
                last_seen = Some(modified);

                match reload(&state).await {
                    Ok(changed) if changed => {
                        let interval_secs = state.config.read().await.interval;
                        runtime.update(interval_secs);
                        bus.emit(AppEvent::RefreshOverlay);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("ignoring config change: {e}"),
                }
            }
        }
    }
}

async fn modified_at(state: &AppState) -> Option<SystemTime> {
    tokio::fs::metadata(&state.config_path)
        .await
        .ok()
        .and_then(|m| m.modified().ok())
}

/// Reload and validate the file; keeps the old config on any error.
/// Returns whether the config actually changed.
async fn reload(state: &AppState) -> anyhow::Result<bool> {
    let config = Config::load(&state.config_path)?;
    config.validate()?;

    let mut current = state.config.write().await;
    if *current == config {
        return Ok(false);
    }

    tracing::info!("config file changed, applying");
    *current = config;
    Ok(true)
}
