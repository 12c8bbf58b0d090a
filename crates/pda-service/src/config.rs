//! # Engine Configuration
//!
//! Every field has a default, so an empty YAML document, or no file at all,
//! yields a working Sierra Leone configuration. Environment variables
//! overlay individual values:
//!
//! - `PDA_ENGINE_TIMEOUT_MS`: geometry engine budget per query.
//! - `PDA_COUNTER_MAX_ATTEMPTS`: attempts for contended counters and locks.
//! - `PDA_BOUNDS`: national box as `min_lat,min_lon,max_lat,max_lon`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pda_core::geohash::MAX_PRECISION;
use pda_core::{BoundingBox, ValidationError};
use pda_registry::RetryPolicy;
use pda_spatial::ValidationConfig;

/// Retry settings of the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Attempts for a contended sequence counter or hierarchy lock.
    pub counter_max_attempts: u32,
    /// Backoff after the first contended attempt; doubles afterwards.
    pub counter_backoff_ms: u64,
    /// Wait for the hierarchy write lock on each attempt.
    pub lock_timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            counter_max_attempts: 5,
            counter_backoff_ms: 5,
            lock_timeout_ms: 250,
        }
    }
}

impl RegistryConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.counter_max_attempts,
            Duration::from_millis(self.counter_backoff_ms),
        )
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// National bounding box used by the coordinate bounds check.
    pub bounds: BoundingBox,
    pub validation: ValidationConfig,
    pub registry: RegistryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::SIERRA_LEONE,
            validation: ValidationConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Load a YAML file. Missing fields take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.validate()
    }

    /// Apply overrides from `lookup` (the environment in production).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup("PDA_ENGINE_TIMEOUT_MS") {
            self.validation.engine_timeout_ms = parse_var("PDA_ENGINE_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("PDA_COUNTER_MAX_ATTEMPTS") {
            self.registry.counter_max_attempts = parse_var("PDA_COUNTER_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("PDA_BOUNDS") {
            self.bounds = parse_bounds(&raw)?;
        }
        self.validate()
    }

    /// Reject values that deserialized but make no sense.
    pub fn validate(self) -> Result<Self, ConfigError> {
        let b = self.bounds;
        BoundingBox::new(b.min_lat, b.min_lon, b.max_lat, b.max_lon)?;
        if !(1..=MAX_PRECISION).contains(&self.validation.geohash_precision) {
            return Err(ConfigError::invalid(
                "validation.geohash_precision",
                self.validation.geohash_precision,
                format!("must be between 1 and {MAX_PRECISION}"),
            ));
        }
        if !(1..=MAX_PRECISION).contains(&self.validation.gap_precision) {
            return Err(ConfigError::invalid(
                "validation.gap_precision",
                self.validation.gap_precision,
                format!("must be between 1 and {MAX_PRECISION}"),
            ));
        }
        if !(self.validation.gap_step_deg.is_finite() && self.validation.gap_step_deg > 0.0) {
            return Err(ConfigError::invalid(
                "validation.gap_step_deg",
                self.validation.gap_step_deg,
                "must be a positive number of degrees",
            ));
        }
        if self.registry.counter_max_attempts == 0 {
            return Err(ConfigError::invalid(
                "registry.counter_max_attempts",
                0,
                "at least one attempt is required",
            ));
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(var, raw, e))
}

fn parse_bounds(raw: &str) -> Result<BoundingBox, ConfigError> {
    let parts = raw
        .split(',')
        .map(|p| parse_var::<f64>("PDA_BOUNDS", p))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [min_lat, min_lon, max_lat, max_lon] => {
            Ok(BoundingBox::new(*min_lat, *min_lon, *max_lat, *max_lon)?)
        }
        _ => Err(ConfigError::invalid(
            "PDA_BOUNDS",
            raw,
            "expected min_lat,min_lon,max_lat,max_lon",
        )),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed config: {0}")]
    Parse(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid bounds: {0}")]
    Bounds(#[from] ValidationError),
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl ToString, reason: impl ToString) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.bounds, BoundingBox::SIERRA_LEONE);
        assert_eq!(config.validation.geohash_precision, 9);
        assert_eq!(config.validation.engine_timeout_ms, 2_000);
        assert_eq!(config.registry.counter_max_attempts, 5);
        assert_eq!(config.registry.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml_str(
            "validation:\n  engine_timeout_ms: 500\nregistry:\n  counter_max_attempts: 3\n",
        )
        .unwrap();
        assert_eq!(config.validation.engine_timeout_ms, 500);
        assert_eq!(config.validation.max_gaps, 50);
        assert_eq!(config.registry.counter_max_attempts, 3);
        assert_eq!(config.bounds, BoundingBox::SIERRA_LEONE);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn loads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bounds:\n  min_lat: 8.0\n  min_lon: -13.5\n  max_lat: 9.0\n  max_lon: -12.5"
        )
        .unwrap();
        let config = EngineConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.bounds.max_lat, 9.0);
    }

    #[test]
    fn missing_file() {
        let err = EngineConfig::from_yaml_file("/nonexistent/pda.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = EngineConfig::from_yaml_str(
            "bounds:\n  min_lat: 10.0\n  min_lon: -13.5\n  max_lat: 6.9\n  max_lon: -10.3\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Bounds(_)));
    }

    #[test]
    fn env_overrides() {
        let config = EngineConfig::default()
            .with_overrides(env(&[
                ("PDA_ENGINE_TIMEOUT_MS", "750"),
                ("PDA_COUNTER_MAX_ATTEMPTS", "8"),
                ("PDA_BOUNDS", "8.0, -13.5, 9.0, -12.5"),
            ]))
            .unwrap();
        assert_eq!(config.validation.engine_timeout_ms, 750);
        assert_eq!(config.registry.counter_max_attempts, 8);
        assert_eq!(config.bounds.min_lat, 8.0);
    }

    #[test]
    fn bad_env_values() {
        let err = EngineConfig::default()
            .with_overrides(env(&[("PDA_ENGINE_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "PDA_ENGINE_TIMEOUT_MS", .. }
        ));

        let err = EngineConfig::default()
            .with_overrides(env(&[("PDA_BOUNDS", "8.0,-13.5,9.0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PDA_BOUNDS", .. }));

        let err = EngineConfig::default()
            .with_overrides(env(&[("PDA_COUNTER_MAX_ATTEMPTS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
