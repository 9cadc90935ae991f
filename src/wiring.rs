use crate::actor;
use crate::bus::{self, ReplicationEventStream};
use crate::checkpoint::Checkpoint;
use crate::tracker::{ClusterTopology, ReplicaId, ReplicationTracker};

pub struct TrackerConfig<C>
where
    C: Checkpoint,
{
    pub logger: slog::Logger,
    pub my_replica_id: ReplicaId,
    pub topology: ClusterTopology,
    pub replication_checkpoint: C,
    // Bound on the single ordered queue feeding the tracker's event loop.
    pub event_queue_buffer_size: usize,
}

/// Wire up a replication tracker and spawn its event loop on the current tokio runtime.
///
/// The returned client is the single inbound entry point (role transitions, acks, local
/// write progress, topology changes, queries); the stream is the outbound side
/// (`ReplicatedTo` notifications, replica-originated acks) for the bus/transport layer
/// to drain.
pub fn create_replication_tracker<C>(config: TrackerConfig<C>) -> (actor::TrackerClient, ReplicationEventStream)
where
    C: Checkpoint + Send + 'static,
{
    let (event_publisher, event_stream) = bus::create_event_stream();

    let tracker = ReplicationTracker::new(
        config.logger.clone(),
        config.my_replica_id,
        config.topology,
        config.replication_checkpoint,
        event_publisher,
    );

    let (client, tracker_actor) = actor::create(config.logger, config.event_queue_buffer_size, tracker);
    tokio::spawn(tracker_actor.run_event_loop());

    (client, event_stream)
}
