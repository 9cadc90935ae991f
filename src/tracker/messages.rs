use crate::checkpoint::LogPosition;
use std::fmt;

/// ReplicaId identifies a cluster member. Opaque to this component; uniqueness is the
/// membership layer's problem.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct ReplicaId(String);

impl ReplicaId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        ReplicaId(id.into())
    }
}

impl fmt::Debug for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ReplicaWriteAck is a replica's report that it has durably written the log up to
/// `position`. Delivered at-least-once; see AckTracker for dedup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplicaWriteAck {
    pub replica_id: ReplicaId,
    pub position: LogPosition,
}

/// ReplicationEvent is what this component publishes outward on the bus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReplicationEvent {
    /// A new quorum-committed position. Emitted exactly once per strict advance of the
    /// committed position, never for a no-op ack.
    ReplicatedTo(LogPosition),

    /// This node's own durable-write progress, emitted while in Replica role for the
    /// leader to consume.
    ReplicaWriteAck(ReplicaWriteAck),
}
