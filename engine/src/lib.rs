#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-facing driver for the double-slit simulation.
//!
//! [`Engine`] routes every command through the world, folds the resulting
//! events into the statistics system, and publishes a fresh immutable
//! [`StatisticsSnapshot`] after each step. Readers on other threads observe
//! snapshots through a cloneable [`SnapshotHandle`].

use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use double_slit_core::{
    Command, ConfigError, EngineConfig, Event, ParameterError, ParameterName, ParticleView,
    RunCounters, SimulationParameters, StatisticsSnapshot,
};
use double_slit_system_statistics::Statistics;
use double_slit_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info};

/// Reasons the engine refuses to start.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EngineError {
    /// The engine configuration is unusable.
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
    /// The initial parameter set failed validation.
    #[error("invalid simulation parameters: {0}")]
    Parameters(#[from] ParameterError),
}

/// Shared, cloneable access to the most recently published statistics.
#[derive(Clone, Debug)]
pub struct SnapshotHandle {
    current: Arc<RwLock<Arc<StatisticsSnapshot>>>,
}

impl SnapshotHandle {
    fn new(snapshot: StatisticsSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Returns the latest snapshot; never blocks for longer than a swap.
    #[must_use]
    pub fn load(&self) -> Arc<StatisticsSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn publish(&self, snapshot: StatisticsSnapshot) {
        let snapshot = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}

/// Single-threaded simulation driver owned by the host.
#[derive(Debug)]
pub struct Engine {
    world: World,
    statistics: Statistics,
    published: SnapshotHandle,
    events: Vec<Event>,
}

impl Engine {
    /// Validates `config` and `parameters` and builds an idle engine.
    pub fn new(
        config: EngineConfig,
        parameters: SimulationParameters,
    ) -> Result<Self, EngineError> {
        parameters.validate()?;

        let world = World::new(&config, parameters.clone())?;
        let statistics = Statistics::new(&config, parameters);
        let published = SnapshotHandle::new(statistics.snapshot());
        info!(
            seed = config.seed,
            bins = config.histogram_bins,
            max_live = config.max_live_particles,
            "double-slit engine ready"
        );

        Ok(Self {
            world,
            statistics,
            published,
            events: Vec::new(),
        })
    }

    /// Advances the simulation by one frame and returns the events it produced.
    ///
    /// Frames longer than the configured maximum are shortened.
    pub fn tick(&mut self, dt: Duration) -> &[Event] {
        self.dispatch(Command::Tick { dt });
        &self.events
    }

    /// Replaces the parameter set.
    ///
    /// Returns whether accumulated data was discarded. When the new set
    /// reshapes the landing distribution, in-flight particles and the
    /// histogram are cleared before this call returns. Rejected sets leave
    /// the previous parameters in force.
    pub fn set_parameters(
        &mut self,
        parameters: SimulationParameters,
    ) -> Result<bool, ParameterError> {
        self.dispatch(Command::ConfigureParameters { parameters });
        for event in &self.events {
            match event {
                Event::ParametersRejected { reason } => return Err(*reason),
                Event::ParametersChanged {
                    distribution_reset,
                    ..
                } => {
                    if *distribution_reset {
                        debug!(
                            expected_fringes = self.statistics.expected_fringe_count(),
                            "distribution changed; run restarted"
                        );
                    }
                    return Ok(*distribution_reset);
                }
                _ => {}
            }
        }
        Ok(false)
    }

    /// Changes a single parameter, keeping the others.
    pub fn set_parameter(
        &mut self,
        name: ParameterName,
        value: f64,
    ) -> Result<bool, ParameterError> {
        let mut parameters = self.parameters().clone();
        parameters.set_value(name, value);
        self.set_parameters(parameters)
    }

    /// Clears particles, counters, and statistics without touching parameters.
    pub fn reset(&mut self) {
        self.dispatch(Command::ResetExperiment);
    }

    fn dispatch(&mut self, command: Command) {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        self.statistics.handle(&self.events);
        self.published.publish(self.statistics.snapshot());
    }

    /// Events produced by the most recent call.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Latest published statistics.
    #[must_use]
    pub fn snapshot(&self) -> Arc<StatisticsSnapshot> {
        self.published.load()
    }

    /// Handle readers can clone and move to other threads.
    #[must_use]
    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.published.clone()
    }

    /// Live statistics aggregator.
    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Parameters currently in force.
    #[must_use]
    pub fn parameters(&self) -> &SimulationParameters {
        query::parameters(&self.world)
    }

    /// Particles in flight or fading, ordered by identifier.
    #[must_use]
    pub fn particles(&self) -> ParticleView {
        query::particle_view(&self.world)
    }

    /// Run tallies since the last reset.
    #[must_use]
    pub fn counters(&self) -> RunCounters {
        query::counters(&self.world)
    }
}
