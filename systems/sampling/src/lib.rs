#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Landing-position sampling for particles crossing the barrier.
//!
//! Positions are drawn by rejection sampling against the landing density with
//! a hard cap on the number of candidates. A small acceptance floor keeps dark
//! regions from stalling the sampler; when the cap is still exhausted the
//! sampler snaps to the nearest bright fringe instead of blocking the tick.

use double_slit_core::{SamplerConfig, SimulationParameters, Slit, SCREEN_HALF_WIDTH};
use double_slit_system_intensity::{
    band_center, density, fringe_spacing, intensity, slit_band_center, CLASSICAL_BAND_SIGMA,
};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::trace;

/// How a sampled position was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleOutcome {
    /// A candidate passed the acceptance test.
    Accepted,
    /// The attempt budget ran out and the deterministic fallback was used.
    Fallback,
}

/// Result of a single landing-position draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Signed screen offset, always within the screen.
    pub position: f64,
    /// Candidates drawn before the sampler settled.
    pub attempts: u32,
    /// Whether the position was accepted or produced by the fallback.
    pub outcome: SampleOutcome,
}

/// Bounded rejection sampler over the landing density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSampler {
    max_attempts: u32,
    acceptance_floor: f64,
}

impl Default for PositionSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

impl PositionSampler {
    /// Creates a sampler using the supplied budget.
    #[must_use]
    pub fn new(config: SamplerConfig) -> Self {
        let acceptance_floor = if config.acceptance_floor.is_finite() {
            config.acceptance_floor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            max_attempts: config.max_attempts,
            acceptance_floor,
        }
    }

    /// Hard cap on candidates drawn per sample.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draws a landing position from the density selected by `parameters`.
    ///
    /// Never draws more than the configured number of candidates.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        parameters: &SimulationParameters,
        rng: &mut R,
    ) -> Sample {
        let mut last_candidate = None;

        for attempt in 1..=self.max_attempts {
            let candidate = rng.gen_range(-SCREEN_HALF_WIDTH..SCREEN_HALF_WIDTH);
            let threshold = self.acceptance_floor
                + (1.0 - self.acceptance_floor) * density(candidate, parameters);
            if rng.gen::<f64>() < threshold {
                return Sample {
                    position: candidate,
                    attempts: attempt,
                    outcome: SampleOutcome::Accepted,
                };
            }
            last_candidate = Some(candidate);
        }

        let position = fallback_position(parameters, last_candidate);
        trace!(
            attempts = self.max_attempts,
            position,
            "rejection budget exhausted; snapped to nearest fringe"
        );
        Sample {
            position,
            attempts: self.max_attempts,
            outcome: SampleOutcome::Fallback,
        }
    }
}

/// Draws a landing position from the classical band behind `slit`.
pub fn sample_band<R: Rng + ?Sized>(
    parameters: &SimulationParameters,
    slit: Slit,
    rng: &mut R,
) -> f64 {
    let offset: f64 = rng.sample(StandardNormal);
    let position = slit_band_center(parameters, slit) + CLASSICAL_BAND_SIGMA * offset;
    position.clamp(-SCREEN_HALF_WIDTH, SCREEN_HALF_WIDTH)
}

/// Deterministic landing position used when rejection sampling gives up.
///
/// Quantizes the last rejected candidate to the nearest bright fringe order
/// that still lies on the screen and passes the barrier; without a candidate
/// the central order is used. With the detector active the nearest band
/// centre is used instead.
#[must_use]
pub fn fallback_position(parameters: &SimulationParameters, candidate: Option<f64>) -> f64 {
    if parameters.detector_active {
        let center = band_center(parameters);
        return match candidate {
            Some(z) if z < 0.0 => -center,
            _ => center,
        };
    }

    let Some(spacing) = fringe_spacing(parameters) else {
        return 0.0;
    };

    let mut max_order = (SCREEN_HALF_WIDTH / spacing).floor();
    while max_order > 0.0 && intensity(max_order * spacing, parameters) <= 0.0 {
        max_order -= 1.0;
    }

    let order = candidate
        .filter(|z| z.is_finite())
        .map_or(0.0, |z| (z / spacing).round());
    order.clamp(-max_order, max_order) * spacing
}
