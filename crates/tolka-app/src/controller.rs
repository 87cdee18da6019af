use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tolka_download::DownloadSet;
use tolka_events::{AppEvent, EventBus};

use crate::events::event_loop;
use crate::io::watcher_io;
use crate::runtime::{OverlayRuntime, RuntimeDeps};
use crate::state::AppState;

/// Application controller for task spawning and lifecycle.
pub struct AppController {
    bus: EventBus,
    state: Arc<AppState>,
    runtime: Arc<OverlayRuntime>,
    downloads: Arc<DownloadSet>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(
        state: Arc<AppState>,
        bus: EventBus,
        runtime: Arc<OverlayRuntime>,
        downloads: Arc<DownloadSet>,
    ) -> Self {
        Self {
            bus,
            state,
            runtime,
            downloads,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self, deps: RuntimeDeps) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Subscribe before anything can emit so the kick-off refresh below
        // is never missed.
        let sub = self.bus.subscribe();
        tasks.spawn(event_loop(
            self.state.clone(),
            self.runtime.clone(),
            deps,
            self.downloads.clone(),
            self.bus.clone(),
            sub,
            self.cancel_token.child_token(),
        ));

        // Config file watcher
        let watcher_interval = Duration::from_millis(1000);
        tasks.spawn(watcher_io(
            self.state.clone(),
            watcher_interval,
            self.cancel_token.child_token(),
            self.bus.clone(),
            self.runtime.clone(),
        ));

        // Bring the overlay up if a region is already configured.
        self.bus.emit(AppEvent::RefreshOverlay);

        tasks
    }

    pub fn shutdown(&self) {
        self.runtime.stop();
        self.cancel_token.cancel();
    }
}
