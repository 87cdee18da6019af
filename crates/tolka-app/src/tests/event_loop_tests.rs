use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tolka_config::Config;
use tolka_download::DownloadSet;
use tolka_events::{AppEvent, EventBus};
use tolka_types::Region;

use crate::events::event_loop;
use crate::runtime::OverlayRuntime;
use crate::state::AppState;
use crate::tests::fakes::{FakeRecognizer, deps_with_recognizer};

struct Harness {
    bus: EventBus,
    runtime: Arc<OverlayRuntime>,
    downloads: Arc<DownloadSet>,
    shutdown: CancellationToken,
    task: tokio::task::JoinHandle<anyhow::Result<()>>,
}

fn spawn_loop(config: Config) -> Harness {
    let bus = EventBus::default();
    let runtime = Arc::new(OverlayRuntime::new(config.interval));
    let downloads = Arc::new(DownloadSet::new());
    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(config, "/nonexistent".into()));
    let (deps, _) = deps_with_recognizer(FakeRecognizer::with_texts(["text"]));

    let sub = bus.subscribe();
    let task = tokio::spawn(event_loop(
        state,
        runtime.clone(),
        deps,
        downloads.clone(),
        bus.clone(),
        sub,
        shutdown.clone(),
    ));

    Harness {
        bus,
        runtime,
        downloads,
        shutdown,
        task,
    }
}

fn config_with_region() -> Config {
    let mut config = Config::default();
    config.region = Some(Region { x: 0, y: 0, w: 640, h: 480 });
    config
}

#[tokio::test]
async fn refresh_overlay_starts_runtime_when_region_is_set() {
    let h = spawn_loop(config_with_region());

    h.bus.emit(AppEvent::RefreshOverlay);
    sleep(Duration::from_millis(100)).await;
    assert!(h.runtime.is_running());

    h.shutdown.cancel();
    timeout(Duration::from_secs(2), h.task)
        .await
        .expect("event loop did not stop")
        .unwrap()
        .unwrap();
    h.runtime.stop();
}

#[tokio::test]
async fn refresh_overlay_without_region_keeps_runtime_down() {
    let h = spawn_loop(Config::default());

    h.bus.emit(AppEvent::RefreshOverlay);
    sleep(Duration::from_millis(100)).await;
    assert!(!h.runtime.is_running());

    h.shutdown.cancel();
    timeout(Duration::from_secs(2), h.task)
        .await
        .expect("event loop did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn stop_download_for_one_file_cancels_only_that_transfer() {
    let h = spawn_loop(Config::default());
    let detection = h.downloads.register("text-detection.rten");
    let recognition = h.downloads.register("text-recognition.rten");

    h.bus.emit(AppEvent::StopDownload {
        file: Some("text-detection.rten".to_string()),
    });
    sleep(Duration::from_millis(100)).await;

    assert!(detection.is_cancelled());
    assert!(!recognition.is_cancelled());
    // A targeted stop is not an app shutdown.
    assert!(!h.shutdown.is_cancelled());

    h.shutdown.cancel();
    timeout(Duration::from_secs(2), h.task)
        .await
        .expect("event loop did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn blanket_stop_download_cancels_all_and_shuts_down() {
    let h = spawn_loop(Config::default());
    let detection = h.downloads.register("text-detection.rten");
    let recognition = h.downloads.register("text-recognition.rten");

    h.bus.emit(AppEvent::StopDownload { file: None });

    timeout(Duration::from_secs(2), h.task)
        .await
        .expect("event loop did not stop")
        .unwrap()
        .unwrap();
    assert!(detection.is_cancelled());
    assert!(recognition.is_cancelled());
    assert!(h.shutdown.is_cancelled());
}

#[tokio::test]
async fn ui_only_events_are_ignored() {
    let h = spawn_loop(Config::default());

    h.bus.emit(AppEvent::NewTranslatedText("hola".to_string()));
    h.bus.emit(AppEvent::OnOffConfigTrayItem(false));
    sleep(Duration::from_millis(100)).await;

    assert!(!h.runtime.is_running());
    assert!(!h.shutdown.is_cancelled());

    h.shutdown.cancel();
    timeout(Duration::from_secs(2), h.task)
        .await
        .expect("event loop did not stop")
        .unwrap()
        .unwrap();
}
