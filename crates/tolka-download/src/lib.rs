use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tolka_events::EventBus;

pub mod progress;
pub mod set;

pub use progress::{ProgressEmitter, ProgressTracker};
pub use set::DownloadSet;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The transfer was stopped on request; the partial file is gone.
    #[error("transfer aborted")]
    Aborted,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tuning for the HTTP client and progress reporting.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub https_only: bool,
    /// Minimum byte delta between two progress emissions; 0 reports every
    /// chunk.
    pub emit_threshold: u64,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            https_only: true,
            emit_threshold: 0,
        }
    }
}

/// Streams files to disk while reporting `DownloadProgress` snapshots on
/// the event bus.
pub struct Downloader {
    client: Client,
    bus: EventBus,
    opts: DownloadOptions,
}

impl Downloader {
    pub fn new(bus: EventBus, opts: DownloadOptions) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(opts.connect_timeout)
            .timeout(opts.request_timeout)
            .https_only(opts.https_only)
            .build()?;

        Ok(Self { client, bus, opts })
    }

    /// Fetch `url` into `dest`, reporting progress under the `file_id`
    /// identifier.
    ///
    /// On cancellation or failure the partial file is removed and no
    /// further progress is emitted for `file_id`; events already queued at
    /// subscribers may still be observed after the fact.
    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        file_id: &str,
        cancel: CancellationToken,
    ) -> Result<(), DownloadError> {
        tracing::info!(file = file_id, url, "starting download");

        let res = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        // 0 means the server did not reveal the length; the tracker then
        // reports an unknown total instead of clamping.
        let total_size = res.content_length().unwrap_or(0);
        let stream = res.bytes_stream();

        self.store_stream(stream, dest, file_id, total_size, cancel)
            .await
    }

    /// Drain a chunk stream into `dest`. Factored out of `fetch` so the
    /// transfer behavior is testable with synthetic streams.
    async fn store_stream<S, E>(
        &self,
        stream: S,
        dest: &Path,
        file_id: &str,
        total_size: u64,
        cancel: CancellationToken,
    ) -> Result<(), DownloadError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        DownloadError: From<E>,
    {
        match self
            .write_chunks(stream, dest, file_id, total_size, cancel)
            .await
        {
            Ok(()) => {
                tracing::info!(file = file_id, "download complete");
                Ok(())
            }
            Err(err) => {
                if let Err(rm) = tokio::fs::remove_file(dest).await {
                    tracing::warn!(file = file_id, error = %rm, "failed to remove partial file");
                }
                Err(err)
            }
        }
    }

    async fn write_chunks<S, E>(
        &self,
        mut stream: S,
        dest: &Path,
        file_id: &str,
        total_size: u64,
        cancel: CancellationToken,
    ) -> Result<(), DownloadError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        DownloadError: From<E>,
    {
        let mut file = File::create(dest).await?;
        let mut tracker = ProgressTracker::new(file_id, total_size);
        let mut emitter = ProgressEmitter::new(&self.bus, self.opts.emit_threshold);

        // Initial snapshot so consumers can show the total before the
        // first chunk lands.
        emitter.emit(tracker.snapshot());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(file = file_id, "download cancelled");
                    return Err(DownloadError::Aborted);
                }
                chunk = stream.next() => match chunk {
                    Some(Ok(chunk)) => {
                        file.write_all(&chunk).await?;
                        emitter.emit(tracker.advance(chunk.len() as u64));
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => {
                        file.flush().await?;
                        emitter.finish(tracker.snapshot());
                        return Ok(());
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tolka_events::AppEvent;
    use tolka_types::DownloadProgress;

    fn chunk(data: &[u8]) -> Result<Bytes, std::io::Error> {
        Ok(Bytes::copy_from_slice(data))
    }

    fn downloader(bus: &EventBus) -> Downloader {
        Downloader::new(bus.clone(), DownloadOptions::default()).unwrap()
    }

    async fn drain_progress(sub: &mut tolka_events::Subscription) -> Vec<DownloadProgress> {
        let mut out = Vec::new();
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(100), sub.recv()).await
        {
            if let AppEvent::DownloadProgress(p) = event {
                out.push(p);
            }
        }
        out
    }

    #[tokio::test]
    async fn transfer_emits_ordered_snapshots_and_writes_file() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();
        let dl = downloader(&bus);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.bin");

        let chunks = stream::iter(vec![chunk(&[1u8; 500]), chunk(&[2u8; 500])]);
        dl.store_stream(chunks, &dest, "model.bin", 1000, CancellationToken::new())
            .await
            .unwrap();

        let seen = drain_progress(&mut sub).await;
        let progress: Vec<u64> = seen.iter().map(|p| p.progress).collect();
        assert_eq!(progress, vec![0, 500, 1000]);
        assert!(seen.iter().all(|p| p.file == "model.bin"));
        assert!(seen.iter().all(|p| p.total_size == 1000));
        assert!(seen.last().unwrap().is_complete());

        assert_eq!(std::fs::read(&dest).unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn stream_failure_removes_partial_file() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();
        let dl = downloader(&bus);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.bin");

        let chunks = stream::iter(vec![
            chunk(&[1u8; 100]),
            Err(std::io::Error::other("connection reset")),
        ]);
        let err = dl
            .store_stream(chunks, &dest, "model.bin", 1000, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Io(_)));
        assert!(!dest.exists());

        // Whatever was reported before the failure is still monotonic.
        let seen = drain_progress(&mut sub).await;
        assert!(seen.windows(2).all(|w| w[0].progress <= w[1].progress));
    }

    #[tokio::test]
    async fn cancellation_aborts_and_stops_progress() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();
        let dl = downloader(&bus);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.bin");

        let cancel = CancellationToken::new();
        // One real chunk, then a stream that never ends: only cancellation
        // can finish this transfer.
        let chunks = stream::iter(vec![chunk(&[1u8; 100])]).chain(stream::pending());

        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel_clone.cancel();
        });

        let err = dl
            .store_stream(chunks, &dest, "model.bin", 1000, cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Aborted));
        assert!(!dest.exists());

        let before = drain_progress(&mut sub).await;
        let highest = before.iter().map(|p| p.progress).max().unwrap_or(0);
        assert!(highest <= 100);

        // After the abort nothing else is emitted for this file.
        assert!(drain_progress(&mut sub).await.is_empty());
    }

    #[tokio::test]
    async fn threshold_coalesces_chunk_storm() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();
        let dl = Downloader::new(
            bus.clone(),
            DownloadOptions {
                emit_threshold: 400,
                ..DownloadOptions::default()
            },
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.bin");

        let chunks = stream::iter((0..100).map(|_| chunk(&[0u8; 10])).collect::<Vec<_>>());
        dl.store_stream(chunks, &dest, "model.bin", 1000, CancellationToken::new())
            .await
            .unwrap();

        let progress: Vec<u64> = drain_progress(&mut sub)
            .await
            .into_iter()
            .map(|p| p.progress)
            .collect();
        assert_eq!(progress, vec![0, 400, 800, 1000]);
    }
}
