use rand::Rng;
use tracing::debug;

use crate::models::{GeoPoint, Rankable, Ranked};
use crate::services::partition::{PartitionOptions, QualityPartitioner};
use crate::utils::geo::distance_km;

/// Sorted, deduplicated bucket boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceBuckets {
    boundaries: Vec<f64>,
}

impl DistanceBuckets {
    /// Non-finite and non-positive boundaries are dropped.
    pub fn new(boundaries: &[f64]) -> Self {
        let mut boundaries: Vec<f64> = boundaries
            .iter()
            .copied()
            .filter(|b| b.is_finite() && *b > 0.0)
            .collect();
        boundaries.sort_by(f64::total_cmp);
        boundaries.dedup();
        Self { boundaries }
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Number of buckets, including overflow and unlocated.
    pub fn bucket_count(&self) -> usize {
        self.boundaries.len() + 2
    }

    /// Index of the bucket holding `distance_km`. `None` maps to the last bucket.
    pub fn index_of(&self, distance_km: Option<f64>) -> usize {
        match distance_km {
            Some(d) if d.is_finite() => self.boundaries.partition_point(|b| *b <= d),
            _ => self.boundaries.len() + 1,
        }
    }
}

/// Distance-Bucketed Ranker
///
/// Distance decides which bucket a candidate lands in; the partitioner decides
/// its position inside the bucket.
#[derive(Debug, Clone)]
pub struct DistanceBucketRanker {
    partitioner: QualityPartitioner,
}

impl DistanceBucketRanker {
    pub fn new(partitioner: QualityPartitioner) -> Self {
        Self { partitioner }
    }

    pub fn rank_by_distance<T: Rankable + Clone>(
        &self,
        items: &[T],
        user_location: Option<GeoPoint>,
        boundaries: &[f64],
        options: PartitionOptions,
    ) -> Vec<Ranked<T>> {
        self.rank_by_distance_with(
            items,
            user_location,
            boundaries,
            options,
            &mut rand::thread_rng(),
        )
    }

    pub fn rank_by_distance_with<T: Rankable + Clone, R: Rng + ?Sized>(
        &self,
        items: &[T],
        user_location: Option<GeoPoint>,
        boundaries: &[f64],
        options: PartitionOptions,
        rng: &mut R,
    ) -> Vec<Ranked<T>> {
        let Some(origin) = user_location else {
            debug!(
                candidates = items.len(),
                "No user location, ranking without distance buckets"
            );
            let unranked = items.iter().cloned().map(|item| Ranked::new(item, None)).collect();
            return self.partitioner.partition_with(unranked, options, rng);
        };

        let mut measured: Vec<Ranked<T>> = items
            .iter()
            .map(|item| {
                let distance = item.coordinates().map(|point| distance_km(origin, point));
                Ranked::new(item.clone(), distance)
            })
            .collect();
        // Stable: equal distances keep their incoming order
        measured.sort_by(|a, b| sort_key(a.distance_km).total_cmp(&sort_key(b.distance_km)));

        let buckets = DistanceBuckets::new(boundaries);
        let mut grouped: Vec<Vec<Ranked<T>>> =
            (0..buckets.bucket_count()).map(|_| Vec::new()).collect();
        for ranked in measured {
            grouped[buckets.index_of(ranked.distance_km)].push(ranked);
        }

        debug!(
            origin = %origin,
            bucket_sizes = ?grouped.iter().map(Vec::len).collect::<Vec<_>>(),
            "Grouped candidates into distance buckets"
        );

        let mut ordered = Vec::with_capacity(items.len());
        for bucket in grouped {
            if bucket.is_empty() {
                continue;
            }
            ordered.extend(self.partitioner.partition_with(bucket, options, rng));
        }
        ordered
    }
}

impl Default for DistanceBucketRanker {
    fn default() -> Self {
        Self::new(QualityPartitioner::default())
    }
}

fn sort_key(distance_km: Option<f64>) -> f64 {
    distance_km.unwrap_or(f64::INFINITY)
}
