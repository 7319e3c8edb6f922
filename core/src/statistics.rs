use serde::{Deserialize, Serialize};

use crate::{SimulationParameters, SCREEN_HALF_WIDTH, SCREEN_WIDTH};

/// Single sample of the theoretical landing density.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Signed screen offset of the sample.
    pub position: f64,
    /// Normalized density in the range 0.0..=1.0.
    pub intensity: f64,
}

/// Read-only statistics published to hosts after every update.
///
/// Moments are measured over bin indices. `total_particles` always equals the
/// sum of `histogram`; lost particles never enter the histogram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// Particles detected on the screen.
    pub total_particles: u64,
    /// Particles absorbed by the barrier.
    pub lost_particles: u64,
    /// Detection counts per bin, left edge of the screen first.
    pub histogram: Vec<u64>,
    /// Bright fringes found in the histogram.
    pub fringe_count: u32,
    /// Bright fringes predicted by the theoretical density.
    pub expected_fringe_count: u32,
    /// Michelson contrast of the histogram.
    pub contrast: f64,
    /// Mean bin index.
    pub mean: f64,
    /// Standard deviation in bins.
    pub std_dev: f64,
    /// Skewness of the bin distribution.
    pub skewness: f64,
    /// Excess kurtosis of the bin distribution.
    pub kurtosis: f64,
    /// Coefficient of determination of the histogram against theory.
    pub fit_quality: f64,
    /// Theoretical density sampled across the screen.
    pub theoretical_curve: Vec<CurvePoint>,
    /// Parameter set the statistics describe.
    pub parameters: SimulationParameters,
}

impl StatisticsSnapshot {
    /// Creates an empty snapshot with zeroed bins for the provided parameters.
    #[must_use]
    pub fn empty(bins: usize, parameters: SimulationParameters) -> Self {
        Self {
            total_particles: 0,
            lost_particles: 0,
            histogram: vec![0; bins],
            fringe_count: 0,
            expected_fringe_count: 0,
            contrast: 0.0,
            mean: 0.0,
            std_dev: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            fit_quality: 0.0,
            theoretical_curve: Vec::new(),
            parameters,
        }
    }

    /// Screen offset at the centre of the provided bin.
    #[must_use]
    pub fn bin_center(&self, index: usize) -> f64 {
        let bins = self.histogram.len().max(1) as f64;
        -SCREEN_HALF_WIDTH + (index as f64 + 0.5) * SCREEN_WIDTH / bins
    }

    /// Fraction of arrivals absorbed by the barrier.
    #[must_use]
    pub fn loss_ratio(&self) -> f64 {
        let arrivals = self.total_particles + self.lost_particles;
        if arrivals == 0 {
            0.0
        } else {
            self.lost_particles as f64 / arrivals as f64
        }
    }
}
