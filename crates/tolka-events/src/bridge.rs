use kanal::{Receiver, Sender};

use crate::{AppEvent, EventBus};

/// Bridge between the async backend and a sync UI thread.
///
/// Window toolkits run their own blocking loop and cannot await the bus,
/// so events are forwarded onto a bounded sync channel the UI can poll.
/// When the UI falls behind, forwarding blocks the bridge task, not the
/// emitters (the bus keeps absorbing up to its ring capacity).
pub struct UiBridge {
    to_ui_tx: Sender<AppEvent>,
}

pub struct UiBridgeHandle {
    pub to_ui_rx: Receiver<AppEvent>,
}

impl UiBridge {
    pub fn new(capacity: usize) -> (Self, UiBridgeHandle) {
        let (to_ui_tx, to_ui_rx) = kanal::bounded(capacity);
        (UiBridge { to_ui_tx }, UiBridgeHandle { to_ui_rx })
    }

    /// Forward bus events to the UI side until the bus closes or the UI
    /// hangs up. The caller subscribes before spawning so nothing emitted
    /// in between is lost.
    pub async fn forward(&self, mut sub: crate::Subscription) {
        while let Some(event) = sub.recv().await {
            if self.to_ui_tx.send(event).is_err() {
                break;
            }
        }
    }
}
