pub mod distance;
pub mod partition;
pub mod query;
pub mod ranking;
pub mod shuffle;

pub use distance::{DistanceBucketRanker, DistanceBuckets};
pub use partition::{PartitionOptions, QualityPartitioner, QualityTier};
pub use query::{CandidateFilter, GeoQueryBuilder, ListingQuery, NearConstraint};
pub use ranking::{RankingContext, RankingOrchestrator};
pub use shuffle::{shuffle, shuffle_in_place, shuffle_with};
