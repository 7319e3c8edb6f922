use double_slit_core::StatisticsConfig;

const EPSILON: f64 = 1e-12;

/// Scales `values` so the largest becomes one; all zeros when nothing is positive.
pub(crate) fn max_normalized<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = values.into_iter().collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max <= EPSILON {
        return vec![0.0; values.len()];
    }
    values.into_iter().map(|value| value / max).collect()
}

/// Moving average over `2 * radius + 1` bins, truncated at the edges.
pub(crate) fn smooth(values: &[f64], radius: usize) -> Vec<f64> {
    (0..values.len())
        .map(|index| {
            let start = index.saturating_sub(radius);
            let end = (index + radius + 1).min(values.len());
            let window = &values[start..end];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Counts bright fringes in an already normalized and smoothed profile.
///
/// A bin is a peak when it rises above its left neighbour, is not exceeded by
/// its right neighbour, clears the adaptive threshold, and stands at least
/// `prominence` above the bins two steps away. Peaks closer than
/// `peak_min_distance` bins collapse into the taller one.
pub(crate) fn count_peaks(smoothed: &[f64], config: &StatisticsConfig) -> u32 {
    peak_bins(smoothed, config).len() as u32
}

pub(crate) fn peak_bins(smoothed: &[f64], config: &StatisticsConfig) -> Vec<usize> {
    let len = smoothed.len();
    if len < 3 {
        return Vec::new();
    }

    let average = smoothed.iter().sum::<f64>() / len as f64;
    let threshold = (average * 0.5).max(0.1);

    let mut peaks: Vec<usize> = Vec::new();
    for index in 1..len - 1 {
        let value = smoothed[index];
        if !(value > smoothed[index - 1] && value >= smoothed[index + 1]) || value < threshold {
            continue;
        }

        let left = smoothed[index.saturating_sub(2)];
        let right = smoothed[(index + 2).min(len - 1)];
        if value - left < config.prominence || value - right < config.prominence {
            continue;
        }

        match peaks.last_mut() {
            Some(previous) if index - *previous < config.peak_min_distance => {
                if value > smoothed[*previous] {
                    *previous = index;
                }
            }
            _ => peaks.push(index),
        }
    }
    peaks
}

/// Michelson contrast of the central part of a normalized, smoothed profile.
pub(crate) fn contrast(smoothed: &[f64], config: &StatisticsConfig) -> f64 {
    let trim = (smoothed.len() as f64 * config.edge_trim_fraction).floor() as usize;
    if smoothed.len() <= 2 * trim {
        return 0.0;
    }
    let central = &smoothed[trim..smoothed.len() - trim];

    let maximum = central.iter().copied().fold(0.0_f64, f64::max);
    let minimum = central
        .iter()
        .copied()
        .filter(|value| *value > config.noise_floor)
        .fold(f64::INFINITY, f64::min);
    if !minimum.is_finite() {
        return 0.0;
    }

    let sum = maximum + minimum;
    if sum <= EPSILON {
        0.0
    } else {
        ((maximum - minimum) / sum).clamp(0.0, 1.0)
    }
}

/// Shape of a histogram measured over bin indices.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Moments {
    pub(crate) mean: f64,
    pub(crate) std_dev: f64,
    pub(crate) skewness: f64,
    pub(crate) kurtosis: f64,
}

pub(crate) fn moments(histogram: &[u64]) -> Moments {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return Moments::default();
    }
    let total = total as f64;

    let mean = histogram
        .iter()
        .enumerate()
        .map(|(index, count)| index as f64 * *count as f64)
        .sum::<f64>()
        / total;

    let mut central = [0.0_f64; 3];
    for (index, count) in histogram.iter().enumerate() {
        let deviation = index as f64 - mean;
        let weight = *count as f64 / total;
        let squared = deviation * deviation;
        central[0] += weight * squared;
        central[1] += weight * squared * deviation;
        central[2] += weight * squared * squared;
    }

    let variance = central[0];
    if variance <= EPSILON {
        return Moments {
            mean,
            ..Moments::default()
        };
    }

    let std_dev = variance.sqrt();
    Moments {
        mean,
        std_dev,
        skewness: central[1] / (variance * std_dev),
        kurtosis: central[2] / (variance * variance) - 3.0,
    }
}

/// Coefficient of determination of `observed` against `expected`, both
/// rescaled to unit mass first. Clamped to `0.0..=1.0`.
pub(crate) fn fit_quality(observed: &[u64], expected: &[f64]) -> f64 {
    if observed.len() != expected.len() || observed.is_empty() {
        return 0.0;
    }

    let observed_mass = observed.iter().sum::<u64>() as f64;
    let expected_mass: f64 = expected.iter().sum();
    if observed_mass <= EPSILON || expected_mass <= EPSILON || !expected_mass.is_finite() {
        return 0.0;
    }

    let mean = 1.0 / observed.len() as f64;
    let mut residual = 0.0;
    let mut spread = 0.0;
    for (count, theory) in observed.iter().zip(expected) {
        let measured = *count as f64 / observed_mass;
        let predicted = theory / expected_mass;
        residual += (measured - predicted) * (measured - predicted);
        spread += (measured - mean) * (measured - mean);
    }

    if spread <= EPSILON {
        return 0.0;
    }
    (1.0 - residual / spread).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_truncates_at_the_edges() {
        let smoothed = smooth(&[3.0, 0.0, 0.0, 0.0, 3.0], 1);
        assert_eq!(smoothed, vec![1.5, 1.0, 0.0, 1.0, 1.5]);
    }

    #[test]
    fn close_peaks_merge_into_the_taller() {
        let config = StatisticsConfig {
            peak_min_distance: 5,
            ..StatisticsConfig::default()
        };
        let profile = [0.0, 0.0, 0.8, 0.5, 0.5, 1.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(peak_bins(&profile, &config), vec![5]);
        assert_eq!(peak_bins(&profile, &StatisticsConfig::default()), vec![2, 5]);
    }

    #[test]
    fn separated_peaks_are_counted() {
        let config = StatisticsConfig::default();
        let profile = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.9, 0.0, 0.0];
        assert_eq!(count_peaks(&profile, &config), 2);
    }

    #[test]
    fn flat_profile_has_no_contrast() {
        let config = StatisticsConfig::default();
        assert_eq!(contrast(&[1.0; 20], &config), 0.0);
        assert_eq!(contrast(&[0.0; 20], &config), 0.0);
    }

    #[test]
    fn symmetric_histogram_has_zero_skew() {
        let shape = moments(&[1, 4, 6, 4, 1]);
        assert!((shape.mean - 2.0).abs() < 1e-12);
        assert!(shape.skewness.abs() < 1e-12);
        assert!((shape.std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_bin_histogram_is_degenerate_safe() {
        let shape = moments(&[0, 0, 7, 0]);
        assert_eq!(shape.mean, 2.0);
        assert_eq!(shape.std_dev, 0.0);
        assert_eq!(shape.kurtosis, 0.0);
    }

    #[test]
    fn perfect_match_scores_one() {
        assert!((fit_quality(&[1, 2, 4, 2, 1], &[0.5, 1.0, 2.0, 1.0, 0.5]) - 1.0).abs() < 1e-12);
        assert_eq!(fit_quality(&[3, 3, 3], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(fit_quality(&[0, 0], &[1.0, 1.0]), 0.0);
    }
}
