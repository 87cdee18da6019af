use std::cmp::min;

use tolka_events::{AppEvent, EventBus};
use tolka_types::DownloadProgress;

/// Byte accounting for one transfer attempt.
///
/// Progress never decreases and never exceeds a known total, whatever the
/// chunk sizes coming off the wire look like.
pub struct ProgressTracker {
    file: String,
    downloaded: u64,
    total_size: u64,
}

impl ProgressTracker {
    pub fn new(file: &str, total_size: u64) -> Self {
        Self {
            file: file.to_string(),
            downloaded: 0,
            total_size,
        }
    }

    /// Account for a received chunk and return the resulting snapshot.
    pub fn advance(&mut self, bytes: u64) -> DownloadProgress {
        self.downloaded = if self.total_size == 0 {
            self.downloaded.saturating_add(bytes)
        } else {
            min(self.downloaded.saturating_add(bytes), self.total_size)
        };
        self.snapshot()
    }

    pub fn snapshot(&self) -> DownloadProgress {
        DownloadProgress {
            file: self.file.clone(),
            progress: self.downloaded,
            total_size: self.total_size,
        }
    }
}

/// Rate-limits progress emissions onto the bus.
///
/// `threshold` is the minimum byte delta between two consecutive
/// emissions; 0 forwards every snapshot. The first and the final snapshot
/// of a transfer always go out.
pub struct ProgressEmitter<'a> {
    bus: &'a EventBus,
    threshold: u64,
    last_emitted: Option<u64>,
}

impl<'a> ProgressEmitter<'a> {
    pub fn new(bus: &'a EventBus, threshold: u64) -> Self {
        Self {
            bus,
            threshold,
            last_emitted: None,
        }
    }

    pub fn emit(&mut self, snapshot: DownloadProgress) {
        let due = match self.last_emitted {
            None => true,
            Some(last) => {
                let delta = snapshot.progress.saturating_sub(last);
                delta >= self.threshold.max(1) || (snapshot.is_complete() && delta > 0)
            }
        };
        if due {
            self.force(snapshot);
        }
    }

    /// Emit unconditionally (used for the terminal snapshot), skipping
    /// only an exact duplicate of the previous emission.
    pub fn finish(&mut self, snapshot: DownloadProgress) {
        if self.last_emitted != Some(snapshot.progress) {
            self.force(snapshot);
        }
    }

    fn force(&mut self, snapshot: DownloadProgress) {
        self.last_emitted = Some(snapshot.progress);
        self.bus.emit(AppEvent::DownloadProgress(snapshot));
    }
}
