#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Closed-form landing density of the double-slit experiment.
//!
//! The interference profile is the product of four factors evaluated at a
//! signed screen offset `z`: partially coherent two-slit interference, the
//! single-slit diffraction envelope, the Gaussian source beam, and the
//! angular cutoff of a thick barrier. With the which-path detector active the
//! profile collapses into two Gaussian bands, one behind each slit. Every
//! function here is pure and returns values in `0.0..=1.0`.

use std::f64::consts::{PI, TAU};

use double_slit_core::{CurvePoint, SimulationParameters, Slit, SCREEN_HALF_WIDTH, SCREEN_WIDTH};

/// Millimetres of scene wavelength per nanometre of physical wavelength.
///
/// Wavelengths are magnified so that millimetre slit geometry produces a
/// handful of resolvable fringes on the scene-sized screen.
pub const WAVELENGTH_SCALE: f64 = 1e-4;

/// Screen offset of a classical band per millimetre of slit distance.
pub const CLASSICAL_BAND_SCALE: f64 = 5.0;

/// Standard deviation of each classical band in scene units.
pub const CLASSICAL_BAND_SIGMA: f64 = 0.45;

const CLASSICAL_BAND_LIMIT: f64 = 0.8 * SCREEN_HALF_WIDTH;
const CUTOFF_ONSET: f64 = 0.8;
const MIXTURE_MODE_ITERATIONS: usize = 64;
const EPSILON: f64 = 1e-9;

/// Normalized sinc, `sin(x) / x`, with the removable singularity filled in.
#[must_use]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        x.sin() / x
    }
}

/// Wavelength expressed in scene millimetres.
#[must_use]
pub fn scene_wavelength(parameters: &SimulationParameters) -> f64 {
    (parameters.wavelength_nm * WAVELENGTH_SCALE).max(EPSILON)
}

fn half_distance(parameters: &SimulationParameters) -> f64 {
    (0.5 * parameters.screen_distance).max(EPSILON)
}

fn sin_theta(z: f64, parameters: &SimulationParameters) -> f64 {
    z / half_distance(parameters)
}

/// Two-slit interference factor with partial coherence.
#[must_use]
pub fn interference_term(z: f64, parameters: &SimulationParameters) -> f64 {
    let visibility = parameters.coherence.clamp(0.0, 1.0);
    let phase =
        TAU * parameters.slit_distance_mm * sin_theta(z, parameters) / scene_wavelength(parameters);
    0.5 + 0.5 * visibility * phase.cos()
}

/// Single-slit diffraction envelope.
#[must_use]
pub fn diffraction_envelope(z: f64, parameters: &SimulationParameters) -> f64 {
    let argument =
        PI * parameters.slit_width_mm * sin_theta(z, parameters) / scene_wavelength(parameters);
    let amplitude = sinc(argument);
    amplitude * amplitude
}

/// Gaussian profile of the source beam.
#[must_use]
pub fn beam_envelope(z: f64, parameters: &SimulationParameters) -> f64 {
    let ratio = z / parameters.beam_width.max(EPSILON);
    (-2.0 * ratio * ratio).exp()
}

/// Largest angle a thick barrier lets through.
#[must_use]
pub fn max_transmission_angle(parameters: &SimulationParameters) -> f64 {
    (parameters.slit_width_mm.max(0.0) / parameters.barrier_thickness_mm.max(EPSILON)).atan()
}

/// Smooth suppression of steep angles by a thick barrier.
///
/// Passes everything below 80% of the maximum angle, blocks everything above
/// it, and eases out quadratically in between.
#[must_use]
pub fn angular_cutoff(z: f64, parameters: &SimulationParameters) -> f64 {
    let theta = (z.abs() / half_distance(parameters)).atan();
    let theta_max = max_transmission_angle(parameters);
    if theta_max <= EPSILON {
        return if theta <= EPSILON { 1.0 } else { 0.0 };
    }

    let onset = CUTOFF_ONSET * theta_max;
    if theta <= onset {
        1.0
    } else if theta >= theta_max {
        0.0
    } else {
        let t = (theta - onset) / (theta_max - onset);
        (1.0 - t) * (1.0 - t)
    }
}

/// Interference intensity at screen offset `z`.
#[must_use]
pub fn intensity(z: f64, parameters: &SimulationParameters) -> f64 {
    let value = interference_term(z, parameters)
        * diffraction_envelope(z, parameters)
        * beam_envelope(z, parameters)
        * angular_cutoff(z, parameters);
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Screen offset of the band behind the upper slit; the lower band mirrors it.
#[must_use]
pub fn band_center(parameters: &SimulationParameters) -> f64 {
    (parameters.slit_distance_mm.max(0.0) * CLASSICAL_BAND_SCALE).min(CLASSICAL_BAND_LIMIT)
}

/// Screen offset of the band behind the provided slit.
#[must_use]
pub fn slit_band_center(parameters: &SimulationParameters, slit: Slit) -> f64 {
    slit.sign() * band_center(parameters)
}

fn band(offset: f64) -> f64 {
    let ratio = offset / CLASSICAL_BAND_SIGMA;
    (-0.5 * ratio * ratio).exp()
}

fn band_mixture(z: f64, center: f64) -> f64 {
    0.5 * (band(z - center) + band(z + center))
}

/// Offset of the mixture's maximum: zero while the bands overlap into one
/// hump, close to the band centre once they separate.
fn mixture_mode(center: f64) -> f64 {
    let sigma_squared = CLASSICAL_BAND_SIGMA * CLASSICAL_BAND_SIGMA;
    // Stationary points satisfy z = c * tanh(c z / σ²).
    let mut mode = center;
    for _ in 0..MIXTURE_MODE_ITERATIONS {
        mode = center * (center * mode / sigma_squared).tanh();
    }
    mode
}

/// Two-band density observed while the which-path detector is active.
///
/// An equal-weight mixture of the Gaussian bands behind each slit, scaled so
/// its maximum is one. This is the distribution `sample_band` draws from when
/// the slit is picked by a fair coin.
#[must_use]
pub fn classical_density(z: f64, parameters: &SimulationParameters) -> f64 {
    let center = band_center(parameters);
    let peak = band_mixture(mixture_mode(center), center);
    if !(peak.is_finite() && peak > EPSILON) {
        return 0.0;
    }
    (band_mixture(z, center) / peak).clamp(0.0, 1.0)
}

/// Landing density for the active detector setting.
#[must_use]
pub fn density(z: f64, parameters: &SimulationParameters) -> f64 {
    if parameters.detector_active {
        classical_density(z, parameters)
    } else {
        intensity(z, parameters)
    }
}

/// Screen distance between neighbouring bright fringes.
///
/// Returns `None` when the geometry admits no finite spacing.
#[must_use]
pub fn fringe_spacing(parameters: &SimulationParameters) -> Option<f64> {
    if parameters.slit_distance_mm <= EPSILON {
        return None;
    }
    let spacing =
        scene_wavelength(parameters) * half_distance(parameters) / parameters.slit_distance_mm;
    (spacing.is_finite() && spacing > 0.0).then_some(spacing)
}

/// Michelson contrast between the central maximum and its first minimum.
///
/// Grows with coherence; zero when the fringes are fully washed out.
#[must_use]
pub fn fringe_visibility(parameters: &SimulationParameters) -> f64 {
    let Some(spacing) = fringe_spacing(parameters) else {
        return 0.0;
    };
    let peak = intensity(0.0, parameters);
    let trough = intensity(0.5 * spacing, parameters);
    let sum = peak + trough;
    if sum <= EPSILON {
        0.0
    } else {
        ((peak - trough) / sum).clamp(0.0, 1.0)
    }
}

/// Samples the landing density at `samples` evenly spaced screen offsets.
///
/// The first and last samples sit on the screen edges.
#[must_use]
pub fn theoretical_curve(parameters: &SimulationParameters, samples: usize) -> Vec<CurvePoint> {
    match samples {
        0 => Vec::new(),
        1 => vec![CurvePoint {
            position: 0.0,
            intensity: density(0.0, parameters),
        }],
        _ => {
            let step = SCREEN_WIDTH / (samples - 1) as f64;
            (0..samples)
                .map(|index| {
                    let position = -SCREEN_HALF_WIDTH + index as f64 * step;
                    CurvePoint {
                        position,
                        intensity: density(position, parameters),
                    }
                })
                .collect()
        }
    }
}

/// Landing density evaluated at the centre of each histogram bin.
#[must_use]
pub fn binned_density(parameters: &SimulationParameters, bins: usize) -> Vec<f64> {
    if bins == 0 {
        return Vec::new();
    }
    let width = SCREEN_WIDTH / bins as f64;
    (0..bins)
        .map(|index| density(-SCREEN_HALF_WIDTH + (index as f64 + 0.5) * width, parameters))
        .collect()
}
