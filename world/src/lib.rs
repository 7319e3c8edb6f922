#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the double-slit experiment.
//!
//! The world owns every in-flight particle, the active parameter set, and the
//! single seeded random source. Hosts mutate it exclusively through [`apply`];
//! each tick spawns, advances, and prunes particles and reports detections as
//! [`Event`] values for statistics systems to fold.

mod particle;

use std::time::Duration;

use double_slit_core::{
    Command, ConfigError, EngineConfig, Event, LifecycleConfig, ParticleId, RunCounters,
    SimulationParameters, SpectralColor,
};
use double_slit_system_sampling::PositionSampler;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use particle::{Environment, Particle};

const FALLBACK_MAX_TICK: Duration = Duration::from_millis(100);

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    parameters: SimulationParameters,
    color: SpectralColor,
    particles: Vec<Particle>,
    sampler: PositionSampler,
    timing: LifecycleConfig,
    max_live_particles: usize,
    max_tick: Duration,
    rng: ChaCha8Rng,
    next_particle_id: u64,
    tick_index: u64,
    counters: RunCounters,
}

impl World {
    /// Creates a world seeded from `config` running the provided parameters.
    ///
    /// The configuration must validate. Parameters are sanitized on the way
    /// in; callers that want rejection instead of clamping validate them first.
    pub fn new(
        config: &EngineConfig,
        parameters: SimulationParameters,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let parameters = parameters.sanitized();
        let max_tick = Duration::try_from_secs_f64(config.max_tick_seconds)
            .ok()
            .filter(|limit| !limit.is_zero())
            .unwrap_or(FALLBACK_MAX_TICK);

        Ok(Self {
            color: parameters.color(),
            parameters,
            particles: Vec::new(),
            sampler: PositionSampler::new(config.sampler),
            timing: config.lifecycle,
            max_live_particles: config.max_live_particles,
            max_tick,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_particle_id: 0,
            tick_index: 0,
            counters: RunCounters::default(),
        })
    }

    fn clear_run(&mut self) {
        self.particles.clear();
        self.counters = RunCounters::default();
    }

    fn spawn(&mut self, dt: f64, out_events: &mut Vec<Event>) {
        let rate = self.parameters.source_intensity * dt;
        let probability = if rate.is_finite() {
            rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if !self.rng.gen_bool(probability) {
            return;
        }

        if self.particles.len() >= self.max_live_particles {
            self.counters.suppressed = self.counters.suppressed.saturating_add(1);
            trace!(live = self.particles.len(), "spawn suppressed at capacity");
            return;
        }

        let id = ParticleId::new(self.next_particle_id);
        self.next_particle_id = self.next_particle_id.wrapping_add(1);
        self.particles
            .push(Particle::spawn(id, self.color, &self.timing, &mut self.rng));
        self.counters.spawned = self.counters.spawned.saturating_add(1);
        out_events.push(Event::ParticleSpawned {
            particle: id,
            color: self.color,
        });
    }

    fn advance_particles(&mut self, dt: f64, out_events: &mut Vec<Event>) {
        let mut environment = Environment {
            parameters: &self.parameters,
            sampler: &self.sampler,
            timing: &self.timing,
            counters: &mut self.counters,
        };
        for particle in &mut self.particles {
            particle.advance(dt, &mut environment, &mut self.rng, out_events);
        }
    }

    fn prune_faded(&mut self, out_events: &mut Vec<Event>) {
        self.particles.retain(|particle| {
            if particle.is_faded() {
                out_events.push(Event::ParticleRemoved {
                    particle: particle.id(),
                });
                false
            } else {
                true
            }
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            let dt = dt.min(world.max_tick);
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            let seconds = dt.as_secs_f64();
            world.spawn(seconds, out_events);
            world.advance_particles(seconds, out_events);
            world.prune_faded(out_events);
        }
        Command::ConfigureParameters { parameters } => {
            if let Err(reason) = parameters.validate() {
                warn!(%reason, "parameter update rejected");
                out_events.push(Event::ParametersRejected { reason });
                return;
            }

            let distribution_reset = world.parameters.alters_distribution(&parameters);
            if distribution_reset {
                world.clear_run();
            }
            world.color = parameters.color();
            world.parameters = parameters.clone();
            debug!(distribution_reset, ?parameters, "parameters replaced");
            out_events.push(Event::ParametersChanged {
                parameters,
                distribution_reset,
            });
        }
        Command::ResetExperiment => {
            world.clear_run();
            debug!("experiment reset");
            out_events.push(Event::ExperimentReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use double_slit_core::{ParticleView, RunCounters, SimulationParameters, SpectralColor};

    use super::World;

    /// Parameter set currently driving the simulation.
    #[must_use]
    pub fn parameters(world: &World) -> &SimulationParameters {
        &world.parameters
    }

    /// Colour assigned to particles of the configured wavelength.
    #[must_use]
    pub fn color(world: &World) -> SpectralColor {
        world.color
    }

    /// Captures a read-only view of every particle still in flight or fading.
    #[must_use]
    pub fn particle_view(world: &World) -> ParticleView {
        ParticleView::from_snapshots(world.particles.iter().map(|p| p.snapshot()).collect())
    }

    /// Number of particles in the live set.
    #[must_use]
    pub fn live_particle_count(world: &World) -> usize {
        world.particles.len()
    }

    /// Tallies accumulated since the last reset.
    #[must_use]
    pub fn counters(world: &World) -> RunCounters {
        world.counters
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
