//! Experiment parameters and the validation boundary that guards them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SpectralColor;

/// Names every adjustable experiment parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterName {
    /// Wavelength of the emitted light in nanometres.
    Wavelength,
    /// Centre-to-centre distance between the slits in millimetres.
    SlitDistance,
    /// Width of each slit in millimetres.
    SlitWidth,
    /// Depth of the barrier in millimetres.
    BarrierThickness,
    /// Fringe visibility fraction.
    Coherence,
    /// Gaussian half-width of the source beam in scene units.
    BeamWidth,
    /// Distance from the barrier to the screen in scene units.
    ScreenDistance,
    /// Expected particle emissions per second.
    SourceIntensity,
    /// Probability that a particle survives the barrier.
    TransmissionEfficiency,
    /// Whether the which-path detector is switched on.
    DetectorActive,
}

impl ParameterName {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Wavelength => "wavelength",
            Self::SlitDistance => "slit distance",
            Self::SlitWidth => "slit width",
            Self::BarrierThickness => "barrier thickness",
            Self::Coherence => "coherence",
            Self::BeamWidth => "beam width",
            Self::ScreenDistance => "screen distance",
            Self::SourceIntensity => "source intensity",
            Self::TransmissionEfficiency => "transmission efficiency",
            Self::DetectorActive => "detector",
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slider metadata describing the admissible range of a parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter described by this entry.
    pub name: ParameterName,
    /// Smallest admissible value.
    pub min: f64,
    /// Largest admissible value.
    pub max: f64,
    /// Value used by [`SimulationParameters::default`].
    pub default: f64,
    /// Increment hosts should use for slider steps.
    pub step: f64,
}

const DESCRIPTORS: [ParameterDescriptor; 10] = [
    ParameterDescriptor {
        name: ParameterName::Wavelength,
        min: 380.0,
        max: 780.0,
        default: 550.0,
        step: 10.0,
    },
    ParameterDescriptor {
        name: ParameterName::SlitDistance,
        min: 0.01,
        max: 1.0,
        default: 0.3,
        step: 0.01,
    },
    ParameterDescriptor {
        name: ParameterName::SlitWidth,
        min: 0.005,
        max: 0.5,
        default: 0.05,
        step: 0.005,
    },
    ParameterDescriptor {
        name: ParameterName::BarrierThickness,
        min: 0.01,
        max: 1.0,
        default: 0.1,
        step: 0.01,
    },
    ParameterDescriptor {
        name: ParameterName::Coherence,
        min: 0.0,
        max: 1.0,
        default: 1.0,
        step: 0.01,
    },
    ParameterDescriptor {
        name: ParameterName::BeamWidth,
        min: 0.5,
        max: 20.0,
        default: 8.0,
        step: 0.5,
    },
    ParameterDescriptor {
        name: ParameterName::ScreenDistance,
        min: 5.0,
        max: 60.0,
        default: 20.0,
        step: 1.0,
    },
    ParameterDescriptor {
        name: ParameterName::SourceIntensity,
        min: 0.0,
        max: 240.0,
        default: 40.0,
        step: 1.0,
    },
    ParameterDescriptor {
        name: ParameterName::TransmissionEfficiency,
        min: 0.0,
        max: 1.0,
        default: 1.0,
        step: 0.01,
    },
    ParameterDescriptor {
        name: ParameterName::DetectorActive,
        min: 0.0,
        max: 1.0,
        default: 0.0,
        step: 1.0,
    },
];

/// Reasons a parameter set may be rejected at the validation boundary.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ParameterError {
    /// The parameter holds NaN or an infinity.
    #[error("{parameter} must be a finite number")]
    NotFinite {
        /// Offending parameter.
        parameter: ParameterName,
    },
    /// The parameter lies outside its descriptor range.
    #[error("{parameter} = {value} lies outside {min}..={max}")]
    OutOfRange {
        /// Offending parameter.
        parameter: ParameterName,
        /// Value supplied by the host.
        value: f64,
        /// Smallest admissible value.
        min: f64,
        /// Largest admissible value.
        max: f64,
    },
    /// The slits are as wide as, or wider than, their separation.
    #[error("slit width {width} mm must be smaller than slit distance {distance} mm")]
    SlitsOverlap {
        /// Requested slit width in millimetres.
        width: f64,
        /// Requested slit distance in millimetres.
        distance: f64,
    },
}

/// Immutable snapshot of every experiment knob, replaced wholesale on change.
///
/// Coherence and transmission efficiency are stored as fractions in
/// `0.0..=1.0`. Lengths on the optical bench use millimetres; beam width and
/// screen distance use scene units matching the screen geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Wavelength of the emitted light in nanometres.
    pub wavelength_nm: f64,
    /// Centre-to-centre distance between the slits in millimetres.
    pub slit_distance_mm: f64,
    /// Width of each slit in millimetres.
    pub slit_width_mm: f64,
    /// Depth of the barrier in millimetres; thick barriers collimate.
    pub barrier_thickness_mm: f64,
    /// Fringe visibility fraction; zero washes the fringes out entirely.
    pub coherence: f64,
    /// Gaussian 1/e² half-width of the source beam in scene units.
    pub beam_width: f64,
    /// Distance from the barrier to the screen in scene units.
    pub screen_distance: f64,
    /// Expected particle emissions per second.
    pub source_intensity: f64,
    /// Probability that a particle survives the barrier.
    pub transmission_efficiency: f64,
    /// Whether the which-path detector collapses the pattern into two bands.
    pub detector_active: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        let mut parameters = Self {
            wavelength_nm: 0.0,
            slit_distance_mm: 0.0,
            slit_width_mm: 0.0,
            barrier_thickness_mm: 0.0,
            coherence: 0.0,
            beam_width: 0.0,
            screen_distance: 0.0,
            source_intensity: 0.0,
            transmission_efficiency: 0.0,
            detector_active: false,
        };
        for descriptor in DESCRIPTORS {
            parameters.set_value(descriptor.name, descriptor.default);
        }
        parameters
    }
}

impl SimulationParameters {
    /// Slider metadata for every parameter in declaration order.
    #[must_use]
    pub fn descriptors() -> &'static [ParameterDescriptor] {
        &DESCRIPTORS
    }

    /// Looks up the descriptor for a single parameter.
    #[must_use]
    pub fn descriptor(name: ParameterName) -> ParameterDescriptor {
        DESCRIPTORS
            .iter()
            .copied()
            .find(|descriptor| descriptor.name == name)
            .unwrap_or(ParameterDescriptor {
                name,
                min: f64::MIN,
                max: f64::MAX,
                default: 0.0,
                step: 0.0,
            })
    }

    /// Reads a parameter as a number; the detector maps to `0.0` or `1.0`.
    #[must_use]
    pub fn value(&self, name: ParameterName) -> f64 {
        match name {
            ParameterName::Wavelength => self.wavelength_nm,
            ParameterName::SlitDistance => self.slit_distance_mm,
            ParameterName::SlitWidth => self.slit_width_mm,
            ParameterName::BarrierThickness => self.barrier_thickness_mm,
            ParameterName::Coherence => self.coherence,
            ParameterName::BeamWidth => self.beam_width,
            ParameterName::ScreenDistance => self.screen_distance,
            ParameterName::SourceIntensity => self.source_intensity,
            ParameterName::TransmissionEfficiency => self.transmission_efficiency,
            ParameterName::DetectorActive => {
                if self.detector_active {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Writes a parameter from a number; the detector switches on above `0.5`.
    pub fn set_value(&mut self, name: ParameterName, value: f64) {
        match name {
            ParameterName::Wavelength => self.wavelength_nm = value,
            ParameterName::SlitDistance => self.slit_distance_mm = value,
            ParameterName::SlitWidth => self.slit_width_mm = value,
            ParameterName::BarrierThickness => self.barrier_thickness_mm = value,
            ParameterName::Coherence => self.coherence = value,
            ParameterName::BeamWidth => self.beam_width = value,
            ParameterName::ScreenDistance => self.screen_distance = value,
            ParameterName::SourceIntensity => self.source_intensity = value,
            ParameterName::TransmissionEfficiency => self.transmission_efficiency = value,
            ParameterName::DetectorActive => self.detector_active = value > 0.5,
        }
    }

    /// Checks every parameter against its descriptor and the slit geometry.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for descriptor in DESCRIPTORS {
            let value = self.value(descriptor.name);
            if !value.is_finite() {
                return Err(ParameterError::NotFinite {
                    parameter: descriptor.name,
                });
            }
            if value < descriptor.min || value > descriptor.max {
                return Err(ParameterError::OutOfRange {
                    parameter: descriptor.name,
                    value,
                    min: descriptor.min,
                    max: descriptor.max,
                });
            }
        }

        if self.slit_width_mm >= self.slit_distance_mm {
            return Err(ParameterError::SlitsOverlap {
                width: self.slit_width_mm,
                distance: self.slit_distance_mm,
            });
        }

        Ok(())
    }

    /// Returns a copy clamped into the admissible ranges.
    ///
    /// Non-finite values fall back to their defaults and overlapping slits are
    /// narrowed to half the slit distance, so the result always validates.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut sanitized = self.clone();
        for descriptor in DESCRIPTORS {
            let value = self.value(descriptor.name);
            let value = if value.is_finite() {
                value.clamp(descriptor.min, descriptor.max)
            } else {
                descriptor.default
            };
            sanitized.set_value(descriptor.name, value);
        }

        if sanitized.slit_width_mm >= sanitized.slit_distance_mm {
            let width = Self::descriptor(ParameterName::SlitWidth);
            sanitized.slit_width_mm = (sanitized.slit_distance_mm * 0.5).max(width.min);
        }

        sanitized
    }

    /// Reports whether switching to `other` reshapes the landing distribution.
    ///
    /// Source intensity and transmission efficiency only change how many
    /// particles arrive, never where they land.
    #[must_use]
    pub fn alters_distribution(&self, other: &Self) -> bool {
        self.wavelength_nm != other.wavelength_nm
            || self.slit_distance_mm != other.slit_distance_mm
            || self.slit_width_mm != other.slit_width_mm
            || self.barrier_thickness_mm != other.barrier_thickness_mm
            || self.coherence != other.coherence
            || self.beam_width != other.beam_width
            || self.screen_distance != other.screen_distance
            || self.detector_active != other.detector_active
    }

    /// Perceptual colour of the configured wavelength.
    #[must_use]
    pub fn color(&self) -> SpectralColor {
        SpectralColor::from_wavelength(self.wavelength_nm)
    }
}
