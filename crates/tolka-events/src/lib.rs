//! Event types and channels shared by the backend and its UI hosts.
//!
//! Backend tasks talk through [`EventBus`]. A windowing front end runs
//! its own blocking loop and cannot await the bus, so it embeds
//! [`UiBridge`] and polls the same events from a sync channel instead.

pub mod bridge;
pub mod bus;
pub mod channel;

pub use bridge::{UiBridge, UiBridgeHandle};
pub use bus::{EventBus, Subscription};
pub use channel::Channel;

use serde::{Deserialize, Serialize};
use tolka_types::DownloadProgress;

/// Every message that crosses a window/process boundary, one variant per
/// named channel. The payload shapes are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Enable or disable the "Configuration" tray entry.
    OnOffConfigTrayItem(bool),
    /// The overlay must re-read the config and redraw.
    RefreshOverlay,
    /// A fresh translation for the overlay to display.
    NewTranslatedText(String),
    /// Transfer snapshot from the model downloader.
    DownloadProgress(DownloadProgress),
    /// Cancel in-flight transfers; `None` stops everything.
    StopDownload { file: Option<String> },
}

impl AppEvent {
    /// The named channel this event travels on.
    pub fn channel(&self) -> Channel {
        match self {
            AppEvent::OnOffConfigTrayItem(_) => Channel::OnOffConfigTrayItem,
            AppEvent::RefreshOverlay => Channel::RefreshOverlay,
            AppEvent::NewTranslatedText(_) => Channel::NewTranslatedText,
            AppEvent::DownloadProgress(_) => Channel::DownloadProgress,
            AppEvent::StopDownload { .. } => Channel::StopDownload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_maps_to_its_channel() {
        let cases = [
            (AppEvent::OnOffConfigTrayItem(true), Channel::OnOffConfigTrayItem),
            (AppEvent::RefreshOverlay, Channel::RefreshOverlay),
            (AppEvent::NewTranslatedText("hi".into()), Channel::NewTranslatedText),
            (
                AppEvent::DownloadProgress(DownloadProgress {
                    file: "model.bin".into(),
                    progress: 0,
                    total_size: 0,
                }),
                Channel::DownloadProgress,
            ),
            (AppEvent::StopDownload { file: None }, Channel::StopDownload),
        ];

        for (event, channel) in cases {
            assert_eq!(event.channel(), channel);
        }
    }
}
