use crate::checkpoint::LogPosition;
use crate::tracker::messages::ReplicaId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// AckTracker records, per replica, the highest log position that replica has
/// acknowledged as durably written.
///
/// The transport delivers acks at-least-once and possibly out of order, so records only
/// ever ratchet forward; a duplicate or stale ack mutates nothing. All records are scoped
/// to one leader epoch and wiped on every role transition.
pub(crate) struct AckTracker {
    acked: HashMap<ReplicaId, LogPosition>,
}

impl AckTracker {
    pub(crate) fn new() -> Self {
        AckTracker { acked: HashMap::new() }
    }

    /// record_ack() returns true if the record was created or advanced, false if the ack
    /// carried no new information.
    pub(crate) fn record_ack(&mut self, replica_id: ReplicaId, position: LogPosition) -> bool {
        match self.acked.entry(replica_id) {
            Entry::Vacant(entry) => {
                entry.insert(position);
                true
            }
            Entry::Occupied(mut entry) => {
                if position > *entry.get() {
                    entry.insert(position);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// acked_positions() returns a point-in-time snapshot of tracked replica positions.
    /// The leader's own local position is not in here; the service supplies it separately.
    pub(crate) fn acked_positions(&self) -> Vec<LogPosition> {
        self.acked.values().copied().collect()
    }

    pub(crate) fn reset(&mut self) {
        self.acked.clear();
    }
}
