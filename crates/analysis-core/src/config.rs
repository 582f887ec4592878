use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::AnalysisError;

/// Tunable constants shared by the analysis stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Minimum usable periods for cyclicality and matched points for sensitivity
    pub min_periods: usize,
    /// Largest lag (in periods) tested by the lead/lag search
    pub max_lag: usize,
    /// Fraction trimmed from each end before averaging peer values
    pub trim_fraction: f64,
    /// Sector attractiveness needed to look for relative-value picks
    pub attractiveness_threshold: f64,
    /// Relative-value picks kept per sector
    pub top_per_sector: usize,
    /// Weight of the relative valuation score in the relative-value blend
    pub valuation_blend: f64,
    /// Weight of the quality score in the relative-value blend
    pub quality_blend: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_periods: 8,
            max_lag: 4,
            trim_fraction: 0.1,
            attractiveness_threshold: 70.0,
            top_per_sector: 3,
            valuation_blend: 0.6,
            quality_blend: 0.4,
        }
    }
}

impl EngineConfig {
    /// Build a config from `CYCLE_*` environment variables, keeping the
    /// default for every variable that is not set.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let defaults = Self::default();
        Self {
            min_periods: env_or("CYCLE_MIN_PERIODS", defaults.min_periods)?,
            max_lag: env_or("CYCLE_MAX_LAG", defaults.max_lag)?,
            trim_fraction: env_or("CYCLE_TRIM_FRACTION", defaults.trim_fraction)?,
            attractiveness_threshold: env_or(
                "CYCLE_ATTRACTIVENESS_THRESHOLD",
                defaults.attractiveness_threshold,
            )?,
            top_per_sector: env_or("CYCLE_TOP_PER_SECTOR", defaults.top_per_sector)?,
            valuation_blend: env_or("CYCLE_VALUATION_BLEND", defaults.valuation_blend)?,
            quality_blend: env_or("CYCLE_QUALITY_BLEND", defaults.quality_blend)?,
        }
        .validated()
    }

    /// Reject values the analyzers cannot work with.
    pub fn validated(self) -> Result<Self, AnalysisError> {
        if self.min_periods < 2 {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_periods must be at least 2 (got {})",
                self.min_periods
            )));
        }
        if !(0.0..0.5).contains(&self.trim_fraction) {
            return Err(AnalysisError::InvalidConfig(format!(
                "trim_fraction must be in [0, 0.5) (got {})",
                self.trim_fraction
            )));
        }
        if self.valuation_blend < 0.0 || self.quality_blend < 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "blend weights must be non-negative".to_string(),
            ));
        }
        Ok(self)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, AnalysisError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AnalysisError::InvalidConfig(format!("{}={} is not a valid value", key, raw))),
        Err(_) => Ok(default),
    }
}
