//! Engine tuning surface loaded by hosts before the first tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregated knobs controlling every adjustable aspect of the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the shared pseudo-random source; equal seeds replay identically.
    pub seed: u64,
    /// Number of histogram bins spanning the screen.
    pub histogram_bins: usize,
    /// Number of samples in the published theoretical curve.
    pub curve_resolution: usize,
    /// Live-particle cap; spawns beyond it are dropped.
    pub max_live_particles: usize,
    /// Longest frame delta honoured by a single tick, in seconds.
    pub max_tick_seconds: f64,
    /// Rejection sampler budget.
    pub sampler: SamplerConfig,
    /// Particle motion and fade timing.
    pub lifecycle: LifecycleConfig,
    /// Thresholds used by the derived statistics.
    pub statistics: StatisticsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_d0b1_e511_7000,
            histogram_bins: 50,
            curve_resolution: 200,
            max_live_particles: 120,
            max_tick_seconds: 0.1,
            sampler: SamplerConfig::default(),
            lifecycle: LifecycleConfig::default(),
            statistics: StatisticsConfig::default(),
        }
    }
}

/// Rejection sampler budget.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Hard cap on candidates drawn per sample before falling back.
    pub max_attempts: u32,
    /// Minimum acceptance probability; keeps dark regions from stalling sampling.
    pub acceptance_floor: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            acceptance_floor: 0.03,
        }
    }
}

/// Particle motion and fade timing, in scene units and seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Distance from the source to the barrier plane.
    pub source_distance: f64,
    /// Mean particle speed.
    pub base_speed: f64,
    /// Relative spread of per-particle speeds around the mean.
    pub speed_jitter: f64,
    /// Time spent passing through both slits before the landing is committed.
    pub split_duration: f64,
    /// Fade time of a detection flash.
    pub hit_fade_duration: f64,
    /// Fade time of an absorbed particle.
    pub lost_fade_duration: f64,
    /// Vertical spread of the beam; purely visual.
    pub vertical_spread: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            source_distance: 8.0,
            base_speed: 12.0,
            speed_jitter: 0.15,
            split_duration: 0.35,
            hit_fade_duration: 0.5,
            lost_fade_duration: 0.3,
            vertical_spread: 0.6,
        }
    }
}

/// Thresholds used by the derived statistics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Radius of the moving-average window, in bins.
    pub smoothing_radius: usize,
    /// Hits required before fringes are counted.
    pub min_fringe_samples: u64,
    /// Hits required before contrast is reported.
    pub min_contrast_samples: u64,
    /// Hits required before the fit against theory is reported.
    pub min_fit_samples: u64,
    /// Peaks closer than this many bins merge into the taller one.
    pub peak_min_distance: usize,
    /// Height a peak must clear over the bins two steps away.
    pub prominence: f64,
    /// Fraction of bins trimmed from each edge before measuring contrast.
    pub edge_trim_fraction: f64,
    /// Normalized level below which bins are ignored when finding the contrast minimum.
    pub noise_floor: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            smoothing_radius: 2,
            min_fringe_samples: 20,
            min_contrast_samples: 30,
            min_fit_samples: 30,
            peak_min_distance: 3,
            prominence: 0.02,
            edge_trim_fraction: 0.1,
            noise_floor: 0.02,
        }
    }
}

/// Reasons an engine configuration may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A count that must be non-zero was zero.
    #[error("`{field}` must be greater than zero")]
    Zero {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// A numeric field is NaN, infinite, or on the wrong side of its bound.
    #[error("`{field}` = {value} is invalid: {requirement}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f64,
        /// Constraint the value violates.
        requirement: &'static str,
    },
}

impl EngineConfig {
    /// Checks that every knob lies within a usable range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        nonzero("histogram_bins", self.histogram_bins)?;
        nonzero("curve_resolution", self.curve_resolution)?;
        nonzero("max_live_particles", self.max_live_particles)?;
        positive("max_tick_seconds", self.max_tick_seconds)?;
        fraction("sampler.acceptance_floor", self.sampler.acceptance_floor)?;

        let lifecycle = &self.lifecycle;
        positive("lifecycle.source_distance", lifecycle.source_distance)?;
        positive("lifecycle.base_speed", lifecycle.base_speed)?;
        if !(0.0..1.0).contains(&lifecycle.speed_jitter) {
            return Err(ConfigError::Invalid {
                field: "lifecycle.speed_jitter",
                value: lifecycle.speed_jitter,
                requirement: "must lie within 0..1",
            });
        }
        positive("lifecycle.split_duration", lifecycle.split_duration)?;
        positive("lifecycle.hit_fade_duration", lifecycle.hit_fade_duration)?;
        positive("lifecycle.lost_fade_duration", lifecycle.lost_fade_duration)?;
        non_negative("lifecycle.vertical_spread", lifecycle.vertical_spread)?;

        let statistics = &self.statistics;
        non_negative("statistics.prominence", statistics.prominence)?;
        fraction("statistics.noise_floor", statistics.noise_floor)?;
        if !(0.0..0.5).contains(&statistics.edge_trim_fraction) {
            return Err(ConfigError::Invalid {
                field: "statistics.edge_trim_fraction",
                value: statistics.edge_trim_fraction,
                requirement: "must lie within 0..0.5",
            });
        }

        Ok(())
    }
}

fn nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { field })
    } else {
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value,
            requirement: "must be finite and greater than zero",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value,
            requirement: "must be finite and not negative",
        })
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value,
            requirement: "must lie within 0..=1",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};

    #[test]
    fn defaults_validate() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            seed = 7
            max_live_particles = 32

            [sampler]
            max_attempts = 12
            "#,
        )
        .expect("parse");

        assert_eq!(config.seed, 7);
        assert_eq!(config.max_live_particles, 32);
        assert_eq!(config.sampler.max_attempts, 12);
        assert!((config.sampler.acceptance_floor - 0.03).abs() < f64::EPSILON);
        assert_eq!(config.histogram_bins, 50);
    }

    #[test]
    fn zero_bins_are_rejected() {
        let config = EngineConfig {
            histogram_bins: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "histogram_bins"
            })
        );
    }

    #[test]
    fn negative_speed_is_rejected() {
        let mut config = EngineConfig::default();
        config.lifecycle.base_speed = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "lifecycle.base_speed",
                ..
            })
        ));
    }
}
