use crate::bus::ReplicationEventPublisher;
use crate::checkpoint::{Checkpoint, LogPosition};
use crate::tracker::acks::AckTracker;
use crate::tracker::messages::{ReplicaId, ReplicaWriteAck, ReplicationEvent};
use crate::tracker::quorum::ClusterTopology;
use std::{cmp, io};

/// ReplicationTracker decides, on the leader, how far the log is replicated to a quorum
/// of the cluster, and on a replica, reports local durable-write progress toward the
/// leader.
///
/// One instance is owned by one actor event loop; handlers are synchronous and processed
/// strictly in arrival order. See `crate::actor`.
pub struct ReplicationTracker<C>
where
    C: Checkpoint,
{
    logger: slog::Logger,
    my_replica_id: ReplicaId,
    topology: ClusterTopology,
    replication_checkpoint: C,
    event_publisher: ReplicationEventPublisher,
    // Our own durable-write progress. Node-level, not epoch-level: it survives role
    // transitions because it describes the local log, not quorum state.
    local_position: LogPosition,
    role: Role,
}

enum Role {
    Unknown,
    Leader(LeaderState),
    Replica(ReplicaState),
}

struct LeaderState {
    acks: AckTracker,
    // Highest position known to be acknowledged by a quorum this epoch. Only ever set to
    // a strictly greater freshly-computed candidate, so monotonic by construction.
    committed_position: LogPosition,
}

struct ReplicaState {
    // Highest position we've reported to the leader this epoch.
    last_acked_position: LogPosition,
}

impl<C> ReplicationTracker<C>
where
    C: Checkpoint,
{
    pub fn new(
        logger: slog::Logger,
        my_replica_id: ReplicaId,
        topology: ClusterTopology,
        replication_checkpoint: C,
        event_publisher: ReplicationEventPublisher,
    ) -> Self {
        ReplicationTracker {
            logger,
            my_replica_id,
            topology,
            replication_checkpoint,
            event_publisher,
            local_position: LogPosition::zero(),
            role: Role::Unknown,
        }
    }

    /// Enter Leader role. Always starts a fresh epoch: the ack tracker is emptied and the
    /// committed position is re-seeded, even if we were already leader.
    ///
    /// The seed is the further of our own durable position (our own ack) and the
    /// checkpoint already on disk. A prior epoch may have committed beyond our own
    /// position via an ahead-of-leader quorum, and the checkpoint never ratchets
    /// backwards, so a new epoch must not start below it.
    ///
    /// The seed is a starting point, not an advance: no checkpoint write, no notification.
    pub fn handle_become_leader(&mut self) {
        let seed = cmp::max(self.local_position, self.replication_checkpoint.read_non_flushed());
        self.role = Role::Leader(LeaderState {
            acks: AckTracker::new(),
            committed_position: seed,
        });
        slog::info!(self.logger, "Became leader. Committed position seeded at {:?}.", seed);
    }

    /// Enter Replica role, discarding all leader-epoch state. If we already have durable
    /// local progress, report it to the new leader right away rather than waiting for the
    /// next local write.
    pub fn handle_become_replica(&mut self) {
        self.role = Role::Replica(ReplicaState {
            last_acked_position: self.local_position,
        });
        slog::info!(self.logger, "Became replica.");

        if self.local_position > LogPosition::zero() {
            self.publish_own_ack(self.local_position);
        }
    }

    /// Absorb a replica's durable-write progress report, then re-evaluate quorum.
    /// Duplicate and stale acks are not errors; they mutate nothing and must never reach
    /// the checkpoint or the notification sink.
    pub fn handle_replica_write_ack(&mut self, ack: ReplicaWriteAck) -> Result<(), CheckpointWriteError> {
        let leader = match &mut self.role {
            Role::Leader(leader) => leader,
            Role::Replica(_) | Role::Unknown => {
                slog::debug!(self.logger, "Dropping replica write ack while not leader: {:?}", ack);
                return Ok(());
            }
        };

        if !leader.acks.record_ack(ack.replica_id, ack.position) {
            slog::debug!(
                self.logger,
                "Ignoring duplicate/stale replica write ack at {:?}",
                ack.position
            );
            return Ok(());
        }

        self.recompute_committed_position()
    }

    /// Ratchet our own durable-write position. As leader this is one more quorum vote; as
    /// replica it triggers an outbound ack toward the leader.
    pub fn handle_local_write_advanced(&mut self, position: LogPosition) -> Result<(), CheckpointWriteError> {
        if position <= self.local_position {
            slog::debug!(
                self.logger,
                "Ignoring non-advancing local write position {:?}. Current: {:?}",
                position,
                self.local_position
            );
            return Ok(());
        }
        self.local_position = position;

        match &mut self.role {
            Role::Leader(_) => self.recompute_committed_position(),
            Role::Replica(replica) => {
                replica.last_acked_position = position;
                self.publish_own_ack(position);
                Ok(())
            }
            Role::Unknown => Ok(()),
        }
    }

    /// Apply a cluster resize. Quorum size is derived from topology on every evaluation,
    /// so a shrunk cluster can advance the committed position immediately.
    pub fn handle_topology_changed(&mut self, topology: ClusterTopology) -> Result<(), CheckpointWriteError> {
        slog::info!(
            self.logger,
            "Topology changed: cluster size {} -> {}",
            self.topology.cluster_size(),
            topology.cluster_size()
        );
        self.topology = topology;

        match self.role {
            Role::Leader(_) => self.recompute_committed_position(),
            Role::Replica(_) | Role::Unknown => Ok(()),
        }
    }

    /// committed_position() is the highest position known to be replicated to a quorum.
    /// Only meaningful on the leader; replicas never declare anything replicated.
    pub fn committed_position(&self) -> LogPosition {
        match &self.role {
            Role::Leader(leader) => leader.committed_position,
            Role::Replica(_) | Role::Unknown => LogPosition::zero(),
        }
    }

    /// is_current() gates read-availability: true once this node has caught up with the
    /// most recently known local write position. For a single-node cluster this is true
    /// immediately after any local write, because the leader alone satisfies quorum.
    pub fn is_current(&self) -> bool {
        match &self.role {
            Role::Leader(leader) => leader.committed_position >= self.local_position,
            Role::Replica(replica) => replica.last_acked_position >= self.local_position,
            Role::Unknown => false,
        }
    }

    // Re-evaluate the quorum order-statistic and, only on strict advance, write the
    // checkpoint and publish the one externally observable side effect.
    fn recompute_committed_position(&mut self) -> Result<(), CheckpointWriteError> {
        let leader = match &mut self.role {
            Role::Leader(leader) => leader,
            Role::Replica(_) | Role::Unknown => return Ok(()),
        };

        let candidate = match quorum_acked_position(
            self.local_position,
            leader.acks.acked_positions(),
            self.topology.quorum_size(),
        ) {
            Some(candidate) => candidate,
            None => return Ok(()),
        };

        if candidate <= leader.committed_position {
            return Ok(());
        }
        leader.committed_position = candidate;

        // Checkpoint write is a side effect of the quorum decision, not its precondition.
        // A flush failure is fatal to the node; we never let the in-memory committed
        // position and the durable checkpoint diverge by retrying halfway.
        self.replication_checkpoint.write(candidate);
        self.replication_checkpoint
            .flush()
            .map_err(|e| CheckpointWriteError {
                position: candidate,
                source: e,
            })?;

        slog::info!(self.logger, "Replicated to {:?}", candidate);
        self.event_publisher
            .publish(&self.logger, ReplicationEvent::ReplicatedTo(candidate));

        Ok(())
    }

    fn publish_own_ack(&self, position: LogPosition) {
        let ack = ReplicaWriteAck {
            replica_id: self.my_replica_id.clone(),
            position,
        };
        self.event_publisher
            .publish(&self.logger, ReplicationEvent::ReplicaWriteAck(ack));
    }
}

/// The largest position such that at least `quorum_size` voters are at or above it, i.e.
/// the `quorum_size`-th largest acknowledged position. The rank is well-defined on a
/// multiset, so replicas reporting identical positions need no tie-breaking.
///
/// Returns None while fewer than `quorum_size` voters are known. Our own position is
/// always one of the voters; it is not privileged beyond that, so a quorum of
/// ahead-of-leader replicas can carry the result past our own durable position.
fn quorum_acked_position(
    own_position: LogPosition,
    mut acked_positions: Vec<LogPosition>,
    quorum_size: usize,
) -> Option<LogPosition> {
    acked_positions.push(own_position);
    if acked_positions.len() < quorum_size {
        return None;
    }

    acked_positions.sort_unstable_by(|a, b| b.cmp(a));
    Some(acked_positions[quorum_size - 1])
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to flush replication checkpoint at {position:?}: {source:?}")]
pub struct CheckpointWriteError {
    pub position: LogPosition,
    #[source]
    pub source: io::Error,
}
