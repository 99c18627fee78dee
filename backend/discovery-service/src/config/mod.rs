use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Distance bucket upper bounds in km; everything past the last one overflows.
pub const DEFAULT_DISTANCE_BOUNDARIES_KM: [f64; 4] = [1.0, 3.0, 5.0, 10.0];
/// Ratings at or above this land in the high tier.
pub const DEFAULT_HIGH_RATING_THRESHOLD: f64 = 4.5;
/// Ratings at or above this (and below the high threshold) land in the medium tier.
pub const DEFAULT_MEDIUM_RATING_THRESHOLD: f64 = 4.0;
pub const DEFAULT_RADIUS_KM: f64 = 10.0;
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    InvalidVar {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid ranking settings: {0}")]
    Ranking(#[from] envy::Error),

    #[error("invalid ranking settings: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub ranking: RankingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub http_host: String,
    pub http_port: u16,
    pub service_name: String,
    pub catalog_path: Option<String>,
}

/// Business constants for listing discovery, read from `RANKING_*`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_boundaries")]
    pub distance_boundaries_km: Vec<f64>,
    #[serde(default = "default_high_threshold")]
    pub high_rating_threshold: f64,
    #[serde(default = "default_medium_threshold")]
    pub medium_rating_threshold: f64,
    #[serde(default = "default_radius")]
    pub default_radius_km: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "max_limit")]
    pub max_limit: usize,
    #[serde(default = "enabled")]
    pub prioritize_featured: bool,
    #[serde(default = "enabled")]
    pub consider_rating: bool,
}

fn default_boundaries() -> Vec<f64> {
    DEFAULT_DISTANCE_BOUNDARIES_KM.to_vec()
}

fn default_high_threshold() -> f64 {
    DEFAULT_HIGH_RATING_THRESHOLD
}

fn default_medium_threshold() -> f64 {
    DEFAULT_MEDIUM_RATING_THRESHOLD
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_KM
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn max_limit() -> usize {
    MAX_LIMIT
}

fn enabled() -> bool {
    true
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            distance_boundaries_km: default_boundaries(),
            high_rating_threshold: DEFAULT_HIGH_RATING_THRESHOLD,
            medium_rating_threshold: DEFAULT_MEDIUM_RATING_THRESHOLD,
            default_radius_km: DEFAULT_RADIUS_KM,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            prioritize_featured: true,
            consider_rating: true,
        }
    }
}

impl RankingSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings: RankingSettings = envy::prefixed("RANKING_").from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.medium_rating_threshold.is_nan()
            || self.high_rating_threshold.is_nan()
            || self.medium_rating_threshold > self.high_rating_threshold
        {
            return Err(ConfigError::Inconsistent(format!(
                "medium threshold {} exceeds high threshold {}",
                self.medium_rating_threshold, self.high_rating_threshold
            )));
        }
        if !(self.default_radius_km > 0.0 && (self.default_radius_km * 1000.0).is_finite()) {
            return Err(ConfigError::Inconsistent(format!(
                "default radius must be positive, got {}",
                self.default_radius_km
            )));
        }
        if self.max_limit == 0 {
            return Err(ConfigError::Inconsistent(
                "max limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let http_port = env::var("HTTP_PORT").unwrap_or_else(|_| "8012".to_string());
        let http_port = http_port
            .parse()
            .map_err(|_| ConfigError::InvalidVar {
                name: "HTTP_PORT",
                expected: "u16",
                value: http_port.clone(),
            })?;

        Ok(Config {
            service: ServiceConfig {
                http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                http_port,
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "discovery-service".to_string()),
                catalog_path: env::var("CATALOG_PATH").ok().filter(|path| !path.is_empty()),
            },
            ranking: RankingSettings::from_env()?,
        })
    }
}
