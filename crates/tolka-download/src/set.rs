use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// Registry of in-flight transfers keyed by their `file` identifier.
///
/// A `StopDownload` event resolves here: with a file it cancels one
/// transfer, without one it cancels them all.
#[derive(Default)]
pub struct DownloadSet {
    inner: Mutex<HashMap<String, CancellationToken>>,
}

impl DownloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transfer and get its cancellation token. Registering the
    /// same file twice replaces (and cancels) the previous token.
    pub fn register(&self, file: &str) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .inner
            .lock()
            .expect("download set poisoned")
            .insert(file.to_string(), token.clone());
        if let Some(stale) = previous {
            stale.cancel();
        }
        token
    }

    /// Cancel one transfer or all of them; returns how many were signalled.
    pub fn cancel(&self, file: Option<&str>) -> usize {
        let mut inner = self.inner.lock().expect("download set poisoned");
        match file {
            Some(file) => match inner.remove(file) {
                Some(token) => {
                    token.cancel();
                    1
                }
                None => 0,
            },
            None => {
                let n = inner.len();
                for (_, token) in inner.drain() {
                    token.cancel();
                }
                n
            }
        }
    }

    /// Drop a completed transfer's registration.
    pub fn finish(&self, file: &str) {
        self.inner
            .lock()
            .expect("download set poisoned")
            .remove(file);
    }

    pub fn active(&self) -> usize {
        self.inner.lock().expect("download set poisoned").len()
    }
}
