//! Mutual information between two expression vectors, estimated by adaptive
//! partitioning of their joint rank space.

pub mod noise;
pub mod partition;
pub mod rank;

pub use noise::correct_noise;
pub use partition::{adaptive_partition_mi, PartitionMi, DEFAULT_MAX_PARTITIONS};
pub use rank::{rank_pairs, RankedObservation};
