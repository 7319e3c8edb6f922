#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Detection statistics folded from world events.
//!
//! The aggregator owns the screen histogram and the theoretical curve for the
//! active parameter set. Hits and losses arrive as events; derived metrics are
//! computed on demand and degrade to zero whenever the data cannot support
//! them.

mod metrics;

use double_slit_core::{
    CurvePoint, EngineConfig, Event, SimulationParameters, StatisticsConfig, StatisticsSnapshot,
    SCREEN_HALF_WIDTH, SCREEN_WIDTH,
};
use double_slit_system_intensity::{binned_density, theoretical_curve};
use tracing::{debug, warn};

/// Pure system accumulating detections into a histogram.
#[derive(Clone, Debug)]
pub struct Statistics {
    config: StatisticsConfig,
    curve_resolution: usize,
    histogram: Vec<u64>,
    total: u64,
    lost: u64,
    parameters: SimulationParameters,
    curve: Vec<CurvePoint>,
    expected_bins: Vec<f64>,
    expected_fringe_count: u32,
}

impl Statistics {
    /// Creates an empty aggregator for the provided parameters.
    #[must_use]
    pub fn new(config: &EngineConfig, parameters: SimulationParameters) -> Self {
        let mut statistics = Self {
            config: config.statistics,
            curve_resolution: config.curve_resolution,
            histogram: vec![0; config.histogram_bins.max(1)],
            total: 0,
            lost: 0,
            parameters,
            curve: Vec::new(),
            expected_bins: Vec::new(),
            expected_fringe_count: 0,
        };
        statistics.refresh_theory();
        statistics
    }

    /// Folds hit, loss, reset, and parameter events into the histogram.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ParticleHit { position, .. } => {
                    let _ = self.record_hit(*position);
                }
                Event::ParticleLost { .. } => self.record_lost(),
                Event::ParametersChanged {
                    parameters,
                    distribution_reset,
                } => {
                    if *distribution_reset {
                        self.set_parameters(parameters.clone());
                    } else {
                        self.parameters = parameters.clone();
                    }
                }
                Event::ExperimentReset => self.reset(),
                _ => {}
            }
        }
    }

    /// Records a detection at screen offset `z`, returning the bin it landed in.
    ///
    /// Offsets beyond the screen are clamped into the edge bins; non-finite
    /// offsets are discarded.
    pub fn record_hit(&mut self, z: f64) -> Option<usize> {
        if !z.is_finite() {
            warn!(z, "discarding non-finite detection");
            return None;
        }

        let bins = self.histogram.len();
        let width = SCREEN_WIDTH / bins as f64;
        let raw = ((z + SCREEN_HALF_WIDTH) / width).floor();
        let index = if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(bins - 1)
        };

        self.histogram[index] = self.histogram[index].saturating_add(1);
        self.total = self.total.saturating_add(1);
        Some(index)
    }

    /// Records a particle absorbed by the barrier.
    pub fn record_lost(&mut self) {
        self.lost = self.lost.saturating_add(1);
    }

    /// Clears every accumulated count while keeping the current theory.
    pub fn reset(&mut self) {
        self.histogram.iter_mut().for_each(|count| *count = 0);
        self.total = 0;
        self.lost = 0;
    }

    /// Switches to a new parameter set, discarding accumulated data.
    pub fn set_parameters(&mut self, parameters: SimulationParameters) {
        self.reset();
        self.parameters = parameters;
        self.refresh_theory();
        debug!(
            expected_fringes = self.expected_fringe_count,
            "statistics reset for new parameters"
        );
    }

    fn refresh_theory(&mut self) {
        self.curve = theoretical_curve(&self.parameters, self.curve_resolution);
        self.expected_bins = binned_density(&self.parameters, self.histogram.len());
        let normalized = metrics::max_normalized(self.expected_bins.iter().copied());
        let smoothed = metrics::smooth(&normalized, self.config.smoothing_radius);
        self.expected_fringe_count = metrics::count_peaks(&smoothed, &self.config);
    }

    fn smoothed_histogram(&self) -> Vec<f64> {
        let normalized = metrics::max_normalized(self.histogram.iter().map(|count| *count as f64));
        metrics::smooth(&normalized, self.config.smoothing_radius)
    }

    /// Detections recorded since the last reset.
    #[must_use]
    pub fn total_particles(&self) -> u64 {
        self.total
    }

    /// Barrier losses recorded since the last reset.
    #[must_use]
    pub fn lost_particles(&self) -> u64 {
        self.lost
    }

    /// Detection counts per bin, left screen edge first.
    #[must_use]
    pub fn histogram(&self) -> &[u64] {
        &self.histogram
    }

    /// Parameter set the statistics currently describe.
    #[must_use]
    pub fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    /// Number of bright fringes visible in the histogram.
    #[must_use]
    pub fn fringe_count(&self) -> u32 {
        if self.total < self.config.min_fringe_samples {
            return 0;
        }
        metrics::count_peaks(&self.smoothed_histogram(), &self.config)
    }

    /// Bins holding the detected fringe maxima, in screen order.
    #[must_use]
    pub fn fringe_bins(&self) -> Vec<usize> {
        if self.total < self.config.min_fringe_samples {
            return Vec::new();
        }
        metrics::peak_bins(&self.smoothed_histogram(), &self.config)
    }

    /// Fringes the theory predicts for the current parameters.
    #[must_use]
    pub fn expected_fringe_count(&self) -> u32 {
        self.expected_fringe_count
    }

    /// Michelson contrast of the central part of the histogram.
    #[must_use]
    pub fn contrast(&self) -> f64 {
        if self.total < self.config.min_contrast_samples {
            return 0.0;
        }
        metrics::contrast(&self.smoothed_histogram(), &self.config)
    }

    /// Mean bin index of the detections.
    #[must_use]
    pub fn mean(&self) -> f64 {
        metrics::moments(&self.histogram).mean
    }

    /// Standard deviation of the detections in bins.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        metrics::moments(&self.histogram).std_dev
    }

    /// Skewness of the detection distribution.
    #[must_use]
    pub fn skewness(&self) -> f64 {
        metrics::moments(&self.histogram).skewness
    }

    /// Excess kurtosis of the detection distribution.
    #[must_use]
    pub fn kurtosis(&self) -> f64 {
        metrics::moments(&self.histogram).kurtosis
    }

    /// Theoretical density sampled across the screen.
    ///
    /// Recomputed only when the parameters change.
    #[must_use]
    pub fn theoretical_curve(&self) -> &[CurvePoint] {
        &self.curve
    }

    /// R² of the histogram against the theory at the bin centres.
    #[must_use]
    pub fn fit_quality(&self) -> f64 {
        if self.total < self.config.min_fit_samples {
            return 0.0;
        }
        metrics::fit_quality(&self.histogram, &self.expected_bins)
    }

    /// Captures every statistic in one immutable value.
    #[must_use]
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let shape = metrics::moments(&self.histogram);
        StatisticsSnapshot {
            total_particles: self.total,
            lost_particles: self.lost,
            histogram: self.histogram.clone(),
            fringe_count: self.fringe_count(),
            expected_fringe_count: self.expected_fringe_count,
            contrast: self.contrast(),
            mean: shape.mean,
            std_dev: shape.std_dev,
            skewness: shape.skewness,
            kurtosis: shape.kurtosis,
            fit_quality: self.fit_quality(),
            theoretical_curve: self.curve.clone(),
            parameters: self.parameters.clone(),
        }
    }
}
