use tokio::sync::broadcast;

use crate::AppEvent;

/// Fan-out bus connecting the backend to any number of window consumers.
///
/// Delivery is best-effort: emitting with no subscribers is fine, and a
/// subscriber that falls behind the ring buffer loses the oldest events
/// rather than back-pressuring the producer. Within one producer the
/// emission order is preserved for every subscriber.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Default ring capacity, sized for download-progress bursts.
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event; returns how many subscribers will see it.
    pub fn emit(&self, event: AppEvent) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            // No subscribers right now; the event is dropped by design of
            // the host messaging layer.
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// One consumer's view of the bus.
pub struct Subscription {
    rx: broadcast::Receiver<AppEvent>,
}

impl Subscription {
    /// Next event, or `None` once every `EventBus` handle is gone.
    ///
    /// A lagged subscriber skips the lost events and keeps going.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("subscriber lagged, {missed} events lost");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
