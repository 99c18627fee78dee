//! Ranking Orchestrator
//!
//! Single entry point every listing endpoint goes through.
//!
//! # Workflow
//! 1. Shuffle disabled → pass-through (distances still attached when known)
//! 2. Valid user location → distance buckets, partitioner inside each bucket
//! 3. Otherwise → partitioner over the whole candidate set

use rand::Rng;
use tracing::debug;

use crate::config::{RankingSettings, DEFAULT_DISTANCE_BOUNDARIES_KM};
use crate::models::{GeoPoint, Rankable, Ranked};
use crate::services::distance::DistanceBucketRanker;
use crate::services::partition::{PartitionOptions, QualityPartitioner};
use crate::utils::geo::{distance_km, is_valid_coordinates};

/// Per-request ranking inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingContext {
    pub user_location: Option<GeoPoint>,
    pub distance_boundaries: Vec<f64>,
    pub shuffle_enabled: bool,
    pub prioritize_featured: bool,
    pub consider_rating: bool,
}

impl Default for RankingContext {
    fn default() -> Self {
        Self {
            user_location: None,
            distance_boundaries: DEFAULT_DISTANCE_BOUNDARIES_KM.to_vec(),
            shuffle_enabled: true,
            prioritize_featured: true,
            consider_rating: true,
        }
    }
}

impl RankingContext {
    /// Context seeded from configured defaults.
    pub fn from_settings(settings: &RankingSettings) -> Self {
        Self {
            user_location: None,
            distance_boundaries: settings.distance_boundaries_km.clone(),
            shuffle_enabled: true,
            prioritize_featured: settings.prioritize_featured,
            consider_rating: settings.consider_rating,
        }
    }

    pub fn partition_options(&self) -> PartitionOptions {
        PartitionOptions {
            prioritize_featured: self.prioritize_featured,
            maintain_quality_order: self.consider_rating,
        }
    }

    /// The user location, if it still passes validation.
    pub fn valid_location(&self) -> Option<GeoPoint> {
        self.user_location
            .filter(|point| is_valid_coordinates(point.latitude(), point.longitude()))
    }
}

#[derive(Debug, Clone)]
pub struct RankingOrchestrator {
    partitioner: QualityPartitioner,
    bucket_ranker: DistanceBucketRanker,
}

impl Default for RankingOrchestrator {
    fn default() -> Self {
        Self::new(QualityPartitioner::default())
    }
}

impl RankingOrchestrator {
    pub fn new(partitioner: QualityPartitioner) -> Self {
        Self {
            partitioner,
            bucket_ranker: DistanceBucketRanker::new(partitioner),
        }
    }

    pub fn from_settings(settings: &RankingSettings) -> Self {
        Self::new(QualityPartitioner::new(
            settings.high_rating_threshold,
            settings.medium_rating_threshold,
        ))
    }

    pub fn rank<T: Rankable + Clone>(
        &self,
        candidates: &[T],
        context: &RankingContext,
    ) -> Vec<Ranked<T>> {
        self.rank_with(candidates, context, &mut rand::thread_rng())
    }

    pub fn rank_with<T: Rankable + Clone, R: Rng + ?Sized>(
        &self,
        candidates: &[T],
        context: &RankingContext,
        rng: &mut R,
    ) -> Vec<Ranked<T>> {
        let location = context.valid_location();

        if !context.shuffle_enabled {
            debug!(candidates = candidates.len(), "Shuffle disabled, keeping order");
            return candidates
                .iter()
                .map(|item| {
                    let distance = location
                        .zip(item.coordinates())
                        .map(|(origin, point)| distance_km(origin, point));
                    Ranked::new(item.clone(), distance)
                })
                .collect();
        }

        let options = context.partition_options();
        match location {
            Some(origin) => self.bucket_ranker.rank_by_distance_with(
                candidates,
                Some(origin),
                &context.distance_boundaries,
                options,
                rng,
            ),
            None => {
                debug!(
                    candidates = candidates.len(),
                    "No usable user location, falling back to tiered shuffle"
                );
                let unranked = candidates
                    .iter()
                    .cloned()
                    .map(|item| Ranked::new(item, None))
                    .collect();
                self.partitioner.partition_with(unranked, options, rng)
            }
        }
    }
}
