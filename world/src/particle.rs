//! Per-particle state machine driven by the world clock.

use double_slit_core::{
    Event, LifecycleConfig, ParticleId, ParticleSnapshot, Path, Phase, RunCounters,
    SimulationParameters, Slit, SpectralColor, BARRIER_PLANE_X,
};
use double_slit_system_sampling::{sample_band, PositionSampler, SampleOutcome};
use glam::DVec3;
use rand::Rng;
use tracing::trace;

/// Shared state a particle reads and updates while it advances.
pub(crate) struct Environment<'a> {
    pub(crate) parameters: &'a SimulationParameters,
    pub(crate) sampler: &'a PositionSampler,
    pub(crate) timing: &'a LifecycleConfig,
    pub(crate) counters: &'a mut RunCounters,
}

/// Flight stage; the landing target travels with the stages that have one.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    ToBarrier,
    Splitting,
    ToScreen { target: f64 },
    Hit { target: f64 },
    Lost,
}

impl Stage {
    const fn phase(self) -> Phase {
        match self {
            Self::ToBarrier => Phase::ToBarrier,
            Self::Splitting => Phase::Splitting,
            Self::ToScreen { .. } => Phase::ToScreen,
            Self::Hit { .. } => Phase::Hit,
            Self::Lost => Phase::Lost,
        }
    }

    const fn target(self) -> Option<f64> {
        match self {
            Self::ToScreen { target } | Self::Hit { target } => Some(target),
            Self::ToBarrier | Self::Splitting | Self::Lost => None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Particle {
    id: ParticleId,
    position: DVec3,
    stage: Stage,
    speed: f64,
    age: f64,
    path: Option<Path>,
    split_progress: f64,
    launch_z: f64,
    fade_remaining: f64,
    fade_duration: f64,
    color: SpectralColor,
}

impl Particle {
    /// Emits a particle at the source with jittered speed and height.
    pub(crate) fn spawn<R: Rng + ?Sized>(
        id: ParticleId,
        color: SpectralColor,
        timing: &LifecycleConfig,
        rng: &mut R,
    ) -> Self {
        let jitter = timing.speed_jitter * rng.gen_range(-1.0..=1.0);
        let height = 0.5 * timing.vertical_spread * rng.gen_range(-1.0..=1.0);
        Self {
            id,
            position: DVec3::new(BARRIER_PLANE_X - timing.source_distance, height, 0.0),
            stage: Stage::ToBarrier,
            speed: timing.base_speed * (1.0 + jitter),
            age: 0.0,
            path: None,
            split_progress: 0.0,
            launch_z: 0.0,
            fade_remaining: 0.0,
            fade_duration: 0.0,
            color,
        }
    }

    pub(crate) const fn id(&self) -> ParticleId {
        self.id
    }

    /// Terminal particle whose fade has run out.
    pub(crate) fn is_faded(&self) -> bool {
        self.stage.phase().is_terminal() && self.fade_remaining <= 0.0
    }

    /// Moves the particle forward by `dt` seconds, emitting at most one
    /// transition's worth of events.
    pub(crate) fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        environment: &mut Environment<'_>,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) {
        self.age += dt;
        match self.stage {
            Stage::ToBarrier => self.travel_to_barrier(dt, environment, rng, out_events),
            Stage::Splitting => self.split(dt, environment, rng, out_events),
            Stage::ToScreen { target } => {
                self.travel_to_screen(target, dt, environment, out_events);
            }
            Stage::Hit { .. } | Stage::Lost => self.fade_remaining -= dt,
        }
    }

    fn travel_to_barrier<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        environment: &mut Environment<'_>,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) {
        self.position.x += self.speed * dt;
        if self.position.x < BARRIER_PLANE_X {
            return;
        }
        self.position.x = BARRIER_PLANE_X;

        let parameters = environment.parameters;
        let transmission = if parameters.transmission_efficiency.is_finite() {
            parameters.transmission_efficiency.clamp(0.0, 1.0)
        } else {
            0.0
        };

        if !rng.gen_bool(transmission) {
            self.stage = Stage::Lost;
            self.begin_fade(environment.timing.lost_fade_duration);
            environment.counters.lost = environment.counters.lost.saturating_add(1);
            trace!(particle = self.id.get(), "absorbed by the barrier");
            out_events.push(Event::ParticleLost { particle: self.id });
            return;
        }

        if parameters.detector_active {
            let slit = if rng.gen_bool(0.5) {
                Slit::Upper
            } else {
                Slit::Lower
            };
            let path = Path::Through(slit);
            self.path = Some(path);
            self.launch_z = 0.5 * slit.sign() * parameters.slit_distance_mm;
            self.position.z = self.launch_z;
            out_events.push(Event::ParticleTransmitted {
                particle: self.id,
                path,
            });
            let target = sample_band(parameters, slit, rng);
            self.commit(target, out_events);
        } else {
            self.path = Some(Path::Superposed);
            self.stage = Stage::Splitting;
            self.split_progress = 0.0;
            out_events.push(Event::ParticleTransmitted {
                particle: self.id,
                path: Path::Superposed,
            });
        }
    }

    fn split<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        environment: &mut Environment<'_>,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) {
        let step = dt / environment.timing.split_duration;
        self.split_progress = (self.split_progress + step).min(1.0);
        if self.split_progress < 1.0 {
            return;
        }

        let sample = environment.sampler.sample(environment.parameters, rng);
        if sample.outcome == SampleOutcome::Fallback {
            environment.counters.fallbacks = environment.counters.fallbacks.saturating_add(1);
        }
        self.launch_z = 0.0;
        self.commit(sample.position, out_events);
    }

    /// Fixes the landing position; the only way into the screen-bound stage.
    fn commit(&mut self, target: f64, out_events: &mut Vec<Event>) {
        self.stage = Stage::ToScreen { target };
        trace!(particle = self.id.get(), target, "landing committed");
        out_events.push(Event::ParticleCommitted {
            particle: self.id,
            target,
        });
    }

    fn travel_to_screen(
        &mut self,
        target: f64,
        dt: f64,
        environment: &mut Environment<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let screen_x = BARRIER_PLANE_X + environment.parameters.screen_distance.max(f64::EPSILON);
        self.position.x = (self.position.x + self.speed * dt).min(screen_x);

        // Lateral offset eases in quadratically over the flight.
        let progress = ((self.position.x - BARRIER_PLANE_X) / (screen_x - BARRIER_PLANE_X))
            .clamp(0.0, 1.0);
        self.position.z = self.launch_z + (target - self.launch_z) * progress * progress;
        if progress < 1.0 {
            return;
        }

        self.position.z = target;
        self.stage = Stage::Hit { target };
        self.begin_fade(environment.timing.hit_fade_duration);
        environment.counters.hits = environment.counters.hits.saturating_add(1);
        out_events.push(Event::ParticleHit {
            particle: self.id,
            position: target,
            color: self.color,
        });
    }

    fn begin_fade(&mut self, duration: f64) {
        self.fade_duration = duration;
        self.fade_remaining = duration;
    }

    fn opacity(&self) -> f64 {
        if !self.stage.phase().is_terminal() {
            return 1.0;
        }
        if self.fade_duration <= 0.0 {
            return 0.0;
        }
        (self.fade_remaining / self.fade_duration).clamp(0.0, 1.0)
    }

    pub(crate) fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            id: self.id,
            position: self.position,
            phase: self.stage.phase(),
            split_progress: self.split_progress,
            target: self.stage.target(),
            path: self.path,
            age: self.age,
            opacity: self.opacity(),
            is_lost: self.stage == Stage::Lost,
            color: self.color,
        }
    }
}
