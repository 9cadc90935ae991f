use crate::tracker::ReplicationEvent;
use tokio::sync::mpsc;

pub(crate) fn create_event_stream() -> (ReplicationEventPublisher, ReplicationEventStream) {
    let (tx, rx) = mpsc::unbounded_channel();

    let publisher = ReplicationEventPublisher { sender: tx };
    let stream = ReplicationEventStream { receiver: rx };

    (publisher, stream)
}

/// Sending half of the notification bus, owned by the tracker. Publishing is
/// fire-and-forget; a disconnected consumer is logged and otherwise ignored.
pub(crate) struct ReplicationEventPublisher {
    sender: mpsc::UnboundedSender<ReplicationEvent>,
}

impl ReplicationEventPublisher {
    pub(crate) fn publish(&self, logger: &slog::Logger, event: ReplicationEvent) {
        if self.sender.send(event).is_err() {
            slog::warn!(logger, "ReplicationEventStream has disconnected.");
        }
    }
}

/// For the external application (bus/transport layer) to consume replication events.
pub struct ReplicationEventStream {
    receiver: mpsc::UnboundedReceiver<ReplicationEvent>,
}

impl ReplicationEventStream {
    /// next() returns the next published event, or None if the tracker has exited.
    pub async fn next(&mut self) -> Option<ReplicationEvent> {
        self.receiver.recv().await
    }

    /// try_next() returns an already-published event without waiting. Mainly useful for
    /// asserting the *absence* of notifications.
    pub fn try_next(&mut self) -> Option<ReplicationEvent> {
        self.receiver.try_recv().ok()
    }
}
