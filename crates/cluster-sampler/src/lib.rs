//! Groups corpus backdrops by structural similarity and picks one
//! representative per group.

pub mod distance;
pub mod errors;
pub mod kmeans;
pub mod policy;
pub mod sampler;
pub mod summary;

pub use errors::{ClusterError, ClusterResult};
pub use kmeans::{KMeansEngine, Partition};
pub use policy::KMeansPolicy;
pub use sampler::{sample_representatives, Representative};
pub use summary::{decode_summaries, encode_summaries, viewer_url, RepresentativeSummary};
