use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use tolka_download::{DownloadError, DownloadSet, Downloader};
use tolka_events::{AppEvent, EventBus};
use tolka_ocr::ModelStore;

/// Fetch any OCR model files that are not on disk yet.
///
/// Transfers run concurrently and are registered in `downloads`, and a
/// `StopDownload` event on the bus cancels them while this runs (the main
/// event loop is not up yet during boot). Returns whether anything had to
/// be fetched.
pub async fn ensure_models(
    store: &ModelStore,
    downloader: Arc<Downloader>,
    downloads: Arc<DownloadSet>,
    bus: &EventBus,
) -> anyhow::Result<bool> {
    let missing = store.missing();
    if missing.is_empty() {
        tracing::debug!(dir = %store.dir().display(), "all model files present");
        return Ok(false);
    }

    store
        .ensure_dir()
        .with_context(|| format!("creating model dir {}", store.dir().display()))?;

    let mut tasks = JoinSet::new();
    for spec in missing {
        let token = downloads.register(spec.filename);
        let dest = store.path(spec);
        let downloader = downloader.clone();
        let downloads = downloads.clone();

        tasks.spawn(async move {
            let result = downloader.fetch(spec.url, &dest, spec.filename, token).await;
            downloads.finish(spec.filename);
            (spec.filename, result)
        });
    }

    let stop_listener = {
        let downloads = downloads.clone();
        let mut sub = bus.subscribe();
        tokio::spawn(async move {
            while let Some(event) = sub.recv().await {
                if let AppEvent::StopDownload { file } = event {
                    downloads.cancel(file.as_deref());
                }
            }
        })
    };

    let result = join_transfers(&mut tasks, &downloads).await;
    stop_listener.abort();
    result.map(|()| true)
}

/// Await every transfer, reporting the first failure only after the rest
/// have been cancelled and drained. Dropping unfinished tasks instead
/// would abort them mid-write and leave truncated model files that later
/// boots mistake for complete ones.
pub(crate) async fn join_transfers(
    tasks: &mut JoinSet<(&'static str, Result<(), DownloadError>)>,
    downloads: &DownloadSet,
) -> anyhow::Result<()> {
    let mut first_failure = None;

    while let Some(joined) = tasks.join_next().await {
        let (filename, result) = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                downloads.cancel(None);
                first_failure
                    .get_or_insert(anyhow::Error::new(e).context("model download task panicked"));
                continue;
            }
        };

        match result {
            Ok(()) => tracing::info!(file = filename, "model ready"),
            Err(e) => {
                downloads.cancel(None);
                let failure = match e {
                    DownloadError::Aborted => {
                        anyhow::anyhow!("download of {filename} was stopped")
                    }
                    e => anyhow::Error::new(e).context(format!("downloading {filename}")),
                };
                first_failure.get_or_insert(failure);
            }
        }
    }

    match first_failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}
