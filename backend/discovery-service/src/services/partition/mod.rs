use rand::Rng;
use tracing::debug;

use crate::config::{DEFAULT_HIGH_RATING_THRESHOLD, DEFAULT_MEDIUM_RATING_THRESHOLD};
use crate::models::Rankable;
use crate::services::shuffle::shuffle_in_place;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionOptions {
    /// Featured first, then everything else.
    pub prioritize_featured: bool,
    /// High, medium, standard rating tiers. Ignored when `prioritize_featured` is set.
    pub maintain_quality_order: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    High,
    Medium,
    Standard,
}

/// Quality/Featured Partitioner
///
/// Splits candidates into priority tiers, shuffles each tier on its own and
/// concatenates the tiers in priority order. Tier order is fixed; order within
/// a tier changes on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPartitioner {
    high_rating_threshold: f64,
    medium_rating_threshold: f64,
}

impl Default for QualityPartitioner {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_RATING_THRESHOLD, DEFAULT_MEDIUM_RATING_THRESHOLD)
    }
}

impl QualityPartitioner {
    pub fn new(high_rating_threshold: f64, medium_rating_threshold: f64) -> Self {
        Self {
            high_rating_threshold,
            medium_rating_threshold,
        }
    }

    /// Featured items are always high tier. Missing ratings are standard tier.
    pub fn tier_of<T: Rankable>(&self, item: &T) -> QualityTier {
        if item.is_featured() {
            return QualityTier::High;
        }
        match item.rating() {
            Some(rating) if rating >= self.high_rating_threshold => QualityTier::High,
            Some(rating) if rating >= self.medium_rating_threshold => QualityTier::Medium,
            _ => QualityTier::Standard,
        }
    }

    pub fn partition<T: Rankable>(&self, items: Vec<T>, options: PartitionOptions) -> Vec<T> {
        self.partition_with(items, options, &mut rand::thread_rng())
    }

    pub fn partition_with<T: Rankable, R: Rng + ?Sized>(
        &self,
        items: Vec<T>,
        options: PartitionOptions,
        rng: &mut R,
    ) -> Vec<T> {
        if options.prioritize_featured {
            let (featured, rest): (Vec<T>, Vec<T>) =
                items.into_iter().partition(|item| item.is_featured());
            debug!(
                featured = featured.len(),
                non_featured = rest.len(),
                "Partitioned by featured flag"
            );
            return concat_shuffled(vec![featured, rest], rng);
        }

        if options.maintain_quality_order {
            let mut high = Vec::new();
            let mut medium = Vec::new();
            let mut standard = Vec::new();
            for item in items {
                match self.tier_of(&item) {
                    QualityTier::High => high.push(item),
                    QualityTier::Medium => medium.push(item),
                    QualityTier::Standard => standard.push(item),
                }
            }
            debug!(
                high = high.len(),
                medium = medium.len(),
                standard = standard.len(),
                "Partitioned by rating tier"
            );
            return concat_shuffled(vec![high, medium, standard], rng);
        }

        concat_shuffled(vec![items], rng)
    }
}

fn concat_shuffled<T, R: Rng + ?Sized>(tiers: Vec<Vec<T>>, rng: &mut R) -> Vec<T> {
    let mut ordered = Vec::with_capacity(tiers.iter().map(Vec::len).sum());
    for mut tier in tiers {
        shuffle_in_place(&mut tier, rng);
        ordered.append(&mut tier);
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        featured: bool,
        rating: Option<f64>,
    }

    impl Rankable for Item {
        fn coordinates(&self) -> Option<GeoPoint> {
            None
        }

        fn is_featured(&self) -> bool {
            self.featured
        }

        fn rating(&self) -> Option<f64> {
            self.rating
        }
    }

    fn item(id: u32, featured: bool, rating: Option<f64>) -> Item {
        Item {
            id,
            featured,
            rating,
        }
    }

    #[test]
    fn test_featured_first() {
        let partitioner = QualityPartitioner::default();
        let mut rng = StdRng::seed_from_u64(1);
        let items = vec![
            item(1, false, Some(4.9)),
            item(2, true, Some(2.0)),
            item(3, false, Some(4.8)),
            item(4, true, None),
            item(5, false, None),
        ];
        let options = PartitionOptions {
            prioritize_featured: true,
            maintain_quality_order: true,
        };

        for _ in 0..50 {
            let ordered = partitioner.partition_with(items.clone(), options, &mut rng);
            assert_eq!(ordered.len(), 5);
            assert!(ordered[..2].iter().all(|i| i.featured));
            assert!(ordered[2..].iter().all(|i| !i.featured));
        }
    }

    #[test]
    fn test_quality_tiers() {
        let partitioner = QualityPartitioner::default();
        let mut rng = StdRng::seed_from_u64(2);
        let items = vec![
            item(1, false, Some(3.9)),
            item(2, false, Some(4.0)),
            item(3, false, Some(4.5)),
            item(4, true, Some(1.0)),
            item(5, false, None),
            item(6, false, Some(4.4)),
        ];
        let options = PartitionOptions {
            prioritize_featured: false,
            maintain_quality_order: true,
        };

        for _ in 0..50 {
            let ordered = partitioner.partition_with(items.clone(), options, &mut rng);
            let tiers: Vec<QualityTier> = ordered.iter().map(|i| partitioner.tier_of(i)).collect();
            assert_eq!(
                tiers,
                vec![
                    QualityTier::High,
                    QualityTier::High,
                    QualityTier::Medium,
                    QualityTier::Medium,
                    QualityTier::Standard,
                    QualityTier::Standard,
                ]
            );
        }
    }

    #[test]
    fn test_tier_boundaries() {
        let partitioner = QualityPartitioner::default();
        assert_eq!(partitioner.tier_of(&item(1, false, Some(4.5))), QualityTier::High);
        assert_eq!(partitioner.tier_of(&item(1, false, Some(4.49))), QualityTier::Medium);
        assert_eq!(partitioner.tier_of(&item(1, false, Some(4.0))), QualityTier::Medium);
        assert_eq!(partitioner.tier_of(&item(1, false, Some(3.99))), QualityTier::Standard);
        assert_eq!(partitioner.tier_of(&item(1, false, None)), QualityTier::Standard);
        assert_eq!(partitioner.tier_of(&item(1, true, None)), QualityTier::High);
    }

    #[test]
    fn test_plain_shuffle_keeps_every_item() {
        let partitioner = QualityPartitioner::default();
        let items: Vec<Item> = (0..20).map(|id| item(id, id % 3 == 0, Some(3.0))).collect();

        let mut ids: Vec<u32> = partitioner
            .partition(items, PartitionOptions::default())
            .into_iter()
            .map(|i| i.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_within_tier_order_varies() {
        let partitioner = QualityPartitioner::default();
        let mut rng = StdRng::seed_from_u64(3);
        let items: Vec<Item> = (0..6).map(|id| item(id, true, None)).collect();
        let options = PartitionOptions {
            prioritize_featured: true,
            maintain_quality_order: false,
        };

        let mut firsts = std::collections::HashSet::new();
        for _ in 0..200 {
            let ordered = partitioner.partition_with(items.clone(), options, &mut rng);
            firsts.insert(ordered[0].id);
        }
        assert!(firsts.len() > 1, "top slot never changed");
    }

    #[test]
    fn test_empty_input() {
        let partitioner = QualityPartitioner::default();
        let ordered = partitioner.partition(Vec::<Item>::new(), PartitionOptions::default());
        assert!(ordered.is_empty());
    }
}
