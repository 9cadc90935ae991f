/// ClusterTopology is the cluster membership count for one epoch. It is exogenous input:
/// this component never infers membership from who has acked.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClusterTopology {
    cluster_size: usize,
}

impl ClusterTopology {
    pub fn new(cluster_size: usize) -> Result<Self, InvalidTopologyError> {
        if cluster_size < 1 {
            return Err(InvalidTopologyError { cluster_size });
        }

        Ok(ClusterTopology { cluster_size })
    }

    pub fn single_node() -> Self {
        ClusterTopology { cluster_size: 1 }
    }

    pub fn cluster_size(&self) -> usize {
        self.cluster_size
    }

    /// quorum_size returns the minimum number of nodes (leader included) that must have
    /// acknowledged a position for it to be committable.
    pub fn quorum_size(&self) -> usize {
        (self.cluster_size / 2) + 1
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Cluster size must be at least 1, got {cluster_size}")]
pub struct InvalidTopologyError {
    pub cluster_size: usize,
}
