use serde::{Deserialize, Serialize};

use crate::errors::{ClusterError, ClusterResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KMeansPolicy {
    /// Requested cluster count; fewer non-empty clusters may come back.
    pub clusters: usize,
    pub max_iterations: usize,
}

impl Default for KMeansPolicy {
    fn default() -> Self {
        Self {
            clusters: 5,
            max_iterations: 100,
        }
    }
}

impl KMeansPolicy {
    pub fn new(clusters: usize, max_iterations: usize) -> ClusterResult<Self> {
        let policy = Self {
            clusters,
            max_iterations,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> ClusterResult<()> {
        if self.clusters == 0 {
            return Err(ClusterError::InvalidArg("clusters must be > 0".into()));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::InvalidArg("max_iterations must be > 0".into()));
        }
        Ok(())
    }
}
