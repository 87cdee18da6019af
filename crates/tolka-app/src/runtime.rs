use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tolka_capture::{ScreenFactory, ScreenSource};
use tolka_events::{AppEvent, EventBus};
use tolka_ocr::TextRecognizer;
use tolka_translate::Translator;
use tolka_types::Region;

/// Collaborators of the capture loop, swappable in tests.
#[derive(Clone)]
pub struct RuntimeDeps {
    pub screens: Arc<dyn ScreenFactory>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub translator: Arc<dyn Translator>,
}

/// The periodic capture -> recognize -> translate loop behind the overlay.
///
/// Start and stop follow the overlay lifecycle: the loop runs while a
/// capture region is configured and pauses while the user is reselecting
/// one. The interval can be retuned without a restart.
///
/// Each start installs a fresh cancellation token; stop takes and cancels
/// it. A stop racing a start that failed to open its monitor only touches
/// that run's token, so it cannot wedge a later run.
pub struct OverlayRuntime {
    stop: Mutex<Option<CancellationToken>>,
    interval: Arc<AtomicU8>,
}

impl OverlayRuntime {
    pub fn new(interval: u8) -> Self {
        Self {
            stop: Mutex::new(None),
            interval: Arc::new(AtomicU8::new(interval)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.stop.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self, interval: u8) {
        self.interval.store(interval, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.slot().as_ref().is_some_and(|stop| !stop.is_cancelled())
    }

    pub fn start(
        &self,
        deps: RuntimeDeps,
        monitor: u32,
        region: Region,
        lang: String,
        bus: EventBus,
    ) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|stop| !stop.is_cancelled()) {
            return;
        }
        let stop = CancellationToken::new();
        *slot = Some(stop.clone());
        drop(slot);

        let interval = self.interval.clone();

        tokio::spawn(async move {
            let screen = match deps.screens.open(monitor) {
                Ok(screen) => screen,
                Err(e) => {
                    tracing::error!("cannot open monitor {monitor}: {e}");
                    // Marks this run as over; the token is this run's own.
                    stop.cancel();
                    return;
                }
            };

            tracing::info!(monitor, ?region, lang = %lang, "overlay runtime started");
            let mut old_text = String::new();

            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        tracing::info!("overlay runtime stopped");
                        break;
                    }
                    _ = sleep(Duration::from_secs(interval.load(Ordering::Relaxed).max(1) as u64)) => {
                        let start = Instant::now();
                        if let Err(e) = run_pass(
                            screen.clone(),
                            deps.recognizer.clone(),
                            deps.translator.clone(),
                            region,
                            &lang,
                            &bus,
                            &mut old_text,
                        )
                        .await
                        {
                            tracing::warn!("capture pass failed: {e:#}");
                        }
                        tracing::debug!("screen pass took {}ms", start.elapsed().as_millis());
                    }
                }
            }
        });
    }

    pub fn stop(&self) {
        if let Some(stop) = self.slot().take() {
            stop.cancel();
        }
    }
}

/// One capture pass. Emits `NewTranslatedText` only when the recognized
/// text changed since the previous pass.
pub(crate) async fn run_pass(
    screen: Arc<dyn ScreenSource>,
    recognizer: Arc<dyn TextRecognizer>,
    translator: Arc<dyn Translator>,
    region: Region,
    lang: &str,
    bus: &EventBus,
    old_text: &mut String,
) -> anyhow::Result<()> {
    // Capture and recognition are CPU-bound; keep them off the executor.
    let recognized = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let image = screen.capture(&region)?;
        Ok(recognizer.recognize(&image)?)
    })
    .await??;

    let recognized = recognized.trim().to_string();
    if recognized.is_empty() || recognized == *old_text {
        return Ok(());
    }

    let translated = translator.translate(&recognized, lang).await?;
    *old_text = recognized;

    bus.emit(AppEvent::NewTranslatedText(translated));
    Ok(())
}
