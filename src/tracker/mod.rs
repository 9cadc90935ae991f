mod acks;
mod messages;
mod quorum;
mod service;

pub use messages::ReplicaId;
pub use messages::ReplicaWriteAck;
pub use messages::ReplicationEvent;
pub use quorum::ClusterTopology;
pub use quorum::InvalidTopologyError;
pub use service::CheckpointWriteError;
pub use service::ReplicationTracker;
