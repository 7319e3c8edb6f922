use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use double_slit_core::{Command, EngineConfig, Event, ParticleId, Path, Phase, SimulationParameters};
use double_slit_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(0x5eed, scripted_commands());
    let second = replay(0x5eed, scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first
        .events
        .iter()
        .any(|record| matches!(record, EventRecord::Hit { .. })));
}

#[test]
fn different_seeds_diverge() {
    let first = replay(1, scripted_commands());
    let second = replay(2, scripted_commands());
    assert_ne!(first.fingerprint(), second.fingerprint());
}

fn replay(seed: u64, commands: Vec<Command>) -> ReplayOutcome {
    let config = EngineConfig {
        seed,
        ..EngineConfig::default()
    };
    let mut world = World::new(&config, SimulationParameters::default()).expect("valid config");
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        log.extend(events.iter().map(EventRecord::from));
    }

    let particles = query::particle_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| ParticleState {
            id: snapshot.id,
            phase: snapshot.phase,
            position_bits: [
                snapshot.position.x.to_bits(),
                snapshot.position.y.to_bits(),
                snapshot.position.z.to_bits(),
            ],
        })
        .collect();

    ReplayOutcome {
        particles,
        events: log,
    }
}

fn scripted_commands() -> Vec<Command> {
    let frame = Command::Tick {
        dt: Duration::from_millis(16),
    };
    let mut commands = vec![frame.clone(); 240];
    commands.push(Command::ConfigureParameters {
        parameters: SimulationParameters {
            transmission_efficiency: 0.5,
            ..SimulationParameters::default()
        },
    });
    commands.extend(std::iter::repeat(frame.clone()).take(120));
    commands.push(Command::ConfigureParameters {
        parameters: SimulationParameters {
            detector_active: true,
            ..SimulationParameters::default()
        },
    });
    commands.extend(std::iter::repeat(frame).take(240));
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    particles: Vec<ParticleState>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ParticleState {
    id: ParticleId,
    phase: Phase,
    position_bits: [u64; 3],
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced { dt_micros: u128 },
    Spawned { particle: ParticleId },
    Transmitted { particle: ParticleId, path: Path },
    Committed { particle: ParticleId, target_bits: u64 },
    Hit { particle: ParticleId, position_bits: u64 },
    Lost { particle: ParticleId },
    Removed { particle: ParticleId },
    ParametersChanged { distribution_reset: bool },
    ParametersRejected,
    ExperimentReset,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::TimeAdvanced { dt } => Self::TimeAdvanced {
                dt_micros: dt.as_micros(),
            },
            Event::ParticleSpawned { particle, .. } => Self::Spawned {
                particle: *particle,
            },
            Event::ParticleTransmitted { particle, path } => Self::Transmitted {
                particle: *particle,
                path: *path,
            },
            Event::ParticleCommitted { particle, target } => Self::Committed {
                particle: *particle,
                target_bits: target.to_bits(),
            },
            Event::ParticleHit {
                particle, position, ..
            } => Self::Hit {
                particle: *particle,
                position_bits: position.to_bits(),
            },
            Event::ParticleLost { particle } => Self::Lost {
                particle: *particle,
            },
            Event::ParticleRemoved { particle } => Self::Removed {
                particle: *particle,
            },
            Event::ParametersChanged {
                distribution_reset,
                ..
            } => Self::ParametersChanged {
                distribution_reset: *distribution_reset,
            },
            Event::ParametersRejected { .. } => Self::ParametersRejected,
            Event::ExperimentReset => Self::ExperimentReset,
        }
    }
}
