use crate::checkpoint::{Checkpoint, LogPosition};
use crate::tracker::{CheckpointWriteError, ClusterTopology, ReplicaWriteAck, ReplicationTracker};
use std::fmt::Debug;
use tokio::sync::{mpsc, oneshot};

pub(crate) fn create<C>(
    logger: slog::Logger,
    buffer_size: usize,
    tracker: ReplicationTracker<C>,
) -> (TrackerClient, TrackerActor<C>)
where
    C: Checkpoint,
{
    let (tx, rx) = mpsc::channel(buffer_size);
    let client = TrackerClient { sender: tx };
    let actor = TrackerActor {
        logger,
        receiver: rx,
        tracker,
    };

    (client, actor)
}

// All entry points into the tracker are messages drained from one ordered queue, so
// there is never more than one in-flight mutation of quorum state. Queries ride the same
// queue and therefore observe every message sent before them.
#[derive(Debug)]
enum Event {
    // Any role: start a fresh leader epoch with an empty ack tracker.
    BecomeLeader,

    // Any role: discard leader epoch state, track only local progress.
    BecomeReplica,

    // Leader: absorb into ack tracker, re-evaluate quorum.
    // Replica/Unknown: discard.
    ReplicaWriteAck(ReplicaWriteAck),

    // Leader: own vote advanced, re-evaluate quorum.
    // Replica: emit ack toward leader.
    // Unknown: record progress only.
    LocalWriteAdvanced(LogPosition),

    // Any role: replace topology; as leader, re-evaluate quorum under the new size.
    TopologyChanged(ClusterTopology),

    IsCurrent(Callback<bool>),
    CommittedPosition(Callback<LogPosition>),
}

#[derive(Debug)]
struct Callback<T: Debug>(oneshot::Sender<T>);

impl<T: Debug> Callback<T> {
    pub fn send(self, message: T) {
        let _ = self.0.send(message);
    }
}

#[derive(Clone)]
pub struct TrackerClient {
    sender: mpsc::Sender<Event>,
}

impl TrackerClient {
    pub async fn become_leader(&self) {
        self.send(Event::BecomeLeader).await;
    }

    pub async fn become_replica(&self) {
        self.send(Event::BecomeReplica).await;
    }

    pub async fn replica_write_ack(&self, ack: ReplicaWriteAck) {
        self.send(Event::ReplicaWriteAck(ack)).await;
    }

    pub async fn local_write_advanced(&self, position: LogPosition) {
        self.send(Event::LocalWriteAdvanced(position)).await;
    }

    pub async fn topology_changed(&self, topology: ClusterTopology) {
        self.send(Event::TopologyChanged(topology)).await;
    }

    pub async fn is_current(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        self.send(Event::IsCurrent(Callback(tx))).await;

        rx.await
            .expect("Replication tracker event loop dropped our callback.")
    }

    pub async fn committed_position(&self) -> LogPosition {
        let (tx, rx) = oneshot::channel();
        self.send(Event::CommittedPosition(Callback(tx))).await;

        rx.await
            .expect("Replication tracker event loop dropped our callback.")
    }

    async fn send(&self, event: Event) {
        self.sender
            .send(event)
            .await
            .expect("Replication tracker event loop is dead.")
    }
}

/// TrackerActor is the replication tracker wrapped in an actor-model event loop.
pub struct TrackerActor<C>
where
    C: Checkpoint,
{
    logger: slog::Logger,
    receiver: mpsc::Receiver<Event>,
    tracker: ReplicationTracker<C>,
}

impl<C> TrackerActor<C>
where
    C: Checkpoint,
{
    pub async fn run_event_loop(mut self) {
        while let Some(event) = self.receiver.recv().await {
            if let Err(fatal) = self.handle_event(event) {
                // The storage engine is the durability authority; a failed checkpoint
                // flush means crash-and-recover, not retry. Exiting the loop kills the
                // tracker and every client observes the dead actor.
                slog::crit!(self.logger, "Fatal checkpoint failure: {:?}", fatal);
                return;
            }
        }
    }

    // This must NOT be async. Handlers never block the message-processing thread.
    fn handle_event(&mut self, event: Event) -> Result<(), CheckpointWriteError> {
        match event {
            Event::BecomeLeader => {
                self.tracker.handle_become_leader();
                Ok(())
            }
            Event::BecomeReplica => {
                self.tracker.handle_become_replica();
                Ok(())
            }
            Event::ReplicaWriteAck(ack) => self.tracker.handle_replica_write_ack(ack),
            Event::LocalWriteAdvanced(position) => self.tracker.handle_local_write_advanced(position),
            Event::TopologyChanged(topology) => self.tracker.handle_topology_changed(topology),
            Event::IsCurrent(callback) => {
                callback.send(self.tracker.is_current());
                Ok(())
            }
            Event::CommittedPosition(callback) => {
                callback.send(self.tracker.committed_position());
                Ok(())
            }
        }
    }
}
