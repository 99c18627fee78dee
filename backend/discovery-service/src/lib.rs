pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::{Config, RankingSettings};
pub use error::AppError;
pub use handlers::DiscoveryHandlerState;
pub use models::{GeoPoint, Listing, Rankable, Ranked};
pub use services::{GeoQueryBuilder, QualityPartitioner, RankingContext, RankingOrchestrator};
pub use store::{CandidateStore, InMemoryCandidateStore};
