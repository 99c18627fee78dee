// Utility functions for discovery-service

pub mod geo;

/// Parses a `true|1|false|0` query flag. Anything else is `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a positive result limit and caps it at `max`.
///
/// Missing, unparsable or zero values fall back to `default`.
pub fn parse_limit(raw: Option<&str>, default: usize, max: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(default)
        .min(max)
}
