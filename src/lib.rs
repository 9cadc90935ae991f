mod actor;
mod bus;
mod checkpoint;
mod tracker;
mod wiring;

pub use actor::TrackerClient;
pub use bus::ReplicationEventStream;
pub use checkpoint::Checkpoint;
pub use checkpoint::InMemoryCheckpoint;
pub use checkpoint::LogPosition;
pub use tracker::ClusterTopology;
pub use tracker::InvalidTopologyError;
pub use tracker::ReplicaId;
pub use tracker::ReplicaWriteAck;
pub use tracker::ReplicationEvent;
pub use wiring::create_replication_tracker;
pub use wiring::TrackerConfig;
