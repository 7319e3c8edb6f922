#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the double-slit interference engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! fold deterministically. Systems consume event streams and publish
//! immutable snapshots such as [`StatisticsSnapshot`].

use std::time::Duration;

use glam::DVec3;
use serde::{Deserialize, Serialize};

mod color;
mod config;
mod parameters;
mod statistics;

pub use color::SpectralColor;
pub use config::{
    ConfigError, EngineConfig, LifecycleConfig, SamplerConfig, StatisticsConfig,
};
pub use parameters::{ParameterDescriptor, ParameterError, ParameterName, SimulationParameters};
pub use statistics::{CurvePoint, StatisticsSnapshot};

/// Half of the detection screen width measured in scene units.
pub const SCREEN_HALF_WIDTH: f64 = 5.0;

/// Full width of the detection screen measured in scene units.
pub const SCREEN_WIDTH: f64 = 2.0 * SCREEN_HALF_WIDTH;

/// Position of the two-slit barrier along the travel axis.
pub const BARRIER_PLANE_X: f64 = 0.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the running parameter set wholesale.
    ConfigureParameters {
        /// Parameter snapshot that should become active.
        parameters: SimulationParameters,
    },
    /// Discards every in-flight particle and restarts the run counters.
    ResetExperiment,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the source emitted a new particle.
    ParticleSpawned {
        /// Identifier assigned to the new particle.
        particle: ParticleId,
        /// Colour of the light the particle carries.
        color: SpectralColor,
    },
    /// Reports that a particle survived the barrier.
    ParticleTransmitted {
        /// Identifier of the transmitted particle.
        particle: ParticleId,
        /// Route taken through the barrier.
        path: Path,
    },
    /// Reports that a particle's landing position became fixed.
    ParticleCommitted {
        /// Identifier of the committed particle.
        particle: ParticleId,
        /// Screen offset the particle will land on.
        target: f64,
    },
    /// Reports that a particle landed on the detection screen.
    ParticleHit {
        /// Identifier of the particle that landed.
        particle: ParticleId,
        /// Signed screen offset of the detection.
        position: f64,
        /// Colour of the light the particle carried.
        color: SpectralColor,
    },
    /// Reports that the barrier absorbed a particle.
    ParticleLost {
        /// Identifier of the absorbed particle.
        particle: ParticleId,
    },
    /// Reports that a particle finished fading and left the live set.
    ParticleRemoved {
        /// Identifier of the removed particle.
        particle: ParticleId,
    },
    /// Announces that a new parameter set became active.
    ParametersChanged {
        /// Parameter set now in effect.
        parameters: SimulationParameters,
        /// Whether the landing distribution changed and accumulated data was discarded.
        distribution_reset: bool,
    },
    /// Reports that a parameter update was rejected and the previous set stays active.
    ParametersRejected {
        /// Specific reason the update failed validation.
        reason: ParameterError,
    },
    /// Announces that the experiment was restarted on request.
    ExperimentReset,
}

/// Unique identifier assigned to a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(u64);

impl ParticleId {
    /// Creates a new particle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// One of the two openings carved into the barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slit {
    /// Opening on the negative side of the optical axis.
    Lower,
    /// Opening on the positive side of the optical axis.
    Upper,
}

impl Slit {
    /// Sign of the slit's lateral offset relative to the optical axis.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Lower => -1.0,
            Self::Upper => 1.0,
        }
    }
}

/// Route a particle takes through the barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Path {
    /// Unobserved passage through both slits at once.
    Superposed,
    /// Passage through a single slit revealed by the path detector.
    Through(Slit),
}

/// Lifecycle phase of a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Travelling from the source toward the barrier.
    ToBarrier,
    /// Passing through both slits before a landing position is committed.
    Splitting,
    /// Travelling from the barrier toward the screen.
    ToScreen,
    /// Detected on the screen and fading out.
    Hit,
    /// Absorbed by the barrier and fading out.
    Lost,
}

impl Phase {
    /// Reports whether the phase no longer advances toward the screen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hit | Self::Lost)
    }
}

/// Immutable representation of a single particle's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSnapshot {
    /// Unique identifier assigned to the particle.
    pub id: ParticleId,
    /// Position in scene space; x runs from the source toward the screen.
    pub position: DVec3,
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Progress of the two-slit blend in the range 0.0..=1.0.
    pub split_progress: f64,
    /// Committed landing offset, once known.
    pub target: Option<f64>,
    /// Route taken through the barrier, once transmitted.
    pub path: Option<Path>,
    /// Seconds elapsed since the particle spawned.
    pub age: f64,
    /// Opacity in the range 0.0..=1.0; decays while a terminal particle fades.
    pub opacity: f64,
    /// Indicates whether the barrier absorbed the particle.
    pub is_lost: bool,
    /// Colour of the light the particle carries.
    pub color: SpectralColor,
}

/// Read-only snapshot describing all particles in flight.
#[derive(Clone, Debug, Default)]
pub struct ParticleView {
    snapshots: Vec<ParticleSnapshot>,
}

impl ParticleView {
    /// Creates a new particle view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ParticleSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured particle snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticleSnapshot> {
        self.snapshots.iter()
    }

    /// Number of particles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ParticleSnapshot> {
        self.snapshots
    }
}

/// Tallies accumulated by the world since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunCounters {
    /// Particles emitted by the source.
    pub spawned: u64,
    /// Particles detected on the screen.
    pub hits: u64,
    /// Particles absorbed by the barrier.
    pub lost: u64,
    /// Spawn attempts dropped because the live set was full.
    pub suppressed: u64,
    /// Landing positions resolved by the sampler's fallback.
    pub fallbacks: u64,
}
