use std::{sync::atomic::AtomicBool, sync::atomic::Ordering, thread, time::Duration};

use double_slit_core::{
    EngineConfig, Event, ParameterError, ParameterName, RunCounters, SimulationParameters,
};
use double_slit_engine::Engine;

const FRAME: Duration = Duration::from_millis(16);

fn engine(parameters: SimulationParameters) -> Engine {
    Engine::new(EngineConfig::default(), parameters).expect("valid engine")
}

fn run(engine: &mut Engine, frames: usize, dt: Duration) {
    for _ in 0..frames {
        let _ = engine.tick(dt);
    }
}

fn drain(engine: &mut Engine) {
    assert_eq!(
        engine.set_parameter(ParameterName::SourceIntensity, 0.0),
        Ok(false)
    );
    for _ in 0..1_000 {
        if engine.particles().is_empty() {
            return;
        }
        let _ = engine.tick(FRAME);
    }
    panic!("particles never drained");
}

#[test]
fn drained_run_conserves_every_particle() {
    let mut engine = engine(SimulationParameters {
        transmission_efficiency: 0.7,
        ..SimulationParameters::default()
    });
    run(&mut engine, 900, FRAME);
    drain(&mut engine);

    let snapshot = engine.snapshot();
    let counters = engine.counters();
    assert!(counters.spawned > 100);
    assert_eq!(snapshot.histogram.iter().sum::<u64>(), snapshot.total_particles);
    assert_eq!(
        snapshot.total_particles + snapshot.lost_particles,
        counters.spawned
    );
    assert_eq!(snapshot.total_particles, counters.hits);
    assert_eq!(snapshot.lost_particles, counters.lost);
}

#[test]
fn steady_source_builds_interference_pattern() {
    let mut engine = engine(SimulationParameters {
        source_intensity: 240.0,
        ..SimulationParameters::default()
    });
    run(&mut engine, 1_100, Duration::from_millis(100));

    let snapshot = engine.snapshot();
    assert!(snapshot.total_particles >= 1_000, "{}", snapshot.total_particles);
    assert!((3..=9).contains(&snapshot.fringe_count), "{snapshot:?}");
    assert!(snapshot.contrast > 0.3);
    assert!(snapshot.fit_quality > 0.8);
    assert_eq!(snapshot.expected_fringe_count, 5);
}

#[test]
fn observed_source_builds_two_bands() {
    let mut engine = engine(SimulationParameters {
        source_intensity: 240.0,
        detector_active: true,
        ..SimulationParameters::default()
    });
    run(&mut engine, 1_100, Duration::from_millis(100));

    let snapshot = engine.snapshot();
    assert!(snapshot.total_particles >= 1_000);
    assert!(snapshot.fringe_count <= 2);
    let left: u64 = snapshot.histogram[..25].iter().sum();
    let right: u64 = snapshot.histogram[25..].iter().sum();
    assert!(left > 350 && right > 350, "left {left}, right {right}");
    assert!(snapshot.histogram[24] + snapshot.histogram[25] < 30);
}

#[test]
fn distribution_change_resets_atomically() {
    let mut engine = engine(SimulationParameters::default());
    run(&mut engine, 600, FRAME);
    assert!(engine.snapshot().total_particles > 0);
    assert!(!engine.particles().is_empty());

    let updated = SimulationParameters {
        slit_distance_mm: 0.5,
        ..SimulationParameters::default()
    };
    assert_eq!(engine.set_parameters(updated.clone()), Ok(true));
    assert_eq!(engine.events().len(), 1);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.total_particles, 0);
    assert_eq!(snapshot.lost_particles, 0);
    assert!(snapshot.histogram.iter().all(|count| *count == 0));
    assert_eq!(snapshot.parameters, updated);
    assert!(engine.particles().is_empty());
    assert_eq!(engine.counters(), RunCounters::default());

    let events = engine.tick(FRAME);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ParticleHit { .. })));
}

#[test]
fn rejected_update_keeps_the_run() {
    let mut engine = engine(SimulationParameters::default());
    run(&mut engine, 600, FRAME);
    let before = engine.snapshot();

    let result = engine.set_parameter(ParameterName::BeamWidth, f64::NAN);
    assert_eq!(
        result,
        Err(ParameterError::NotFinite {
            parameter: ParameterName::BeamWidth
        })
    );
    assert_eq!(engine.snapshot().total_particles, before.total_particles);
    assert_eq!(engine.parameters(), &SimulationParameters::default());
}

#[test]
fn manual_reset_clears_statistics() {
    let mut engine = engine(SimulationParameters::default());
    run(&mut engine, 600, FRAME);
    engine.reset();

    assert_eq!(engine.events(), &[Event::ExperimentReset]);
    assert_eq!(engine.snapshot().total_particles, 0);
    assert!(engine.particles().is_empty());
    assert_eq!(engine.parameters(), &SimulationParameters::default());
}

#[test]
fn snapshot_handle_is_readable_from_other_threads() {
    let mut engine = engine(SimulationParameters {
        source_intensity: 120.0,
        ..SimulationParameters::default()
    });
    let handle = engine.snapshot_handle();
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut reads = 0_u32;
            let mut last_total = 0;
            while !done.load(Ordering::Acquire) || reads == 0 {
                let snapshot = handle.load();
                assert_eq!(
                    snapshot.histogram.iter().sum::<u64>(),
                    snapshot.total_particles
                );
                assert!(snapshot.total_particles >= last_total);
                last_total = snapshot.total_particles;
                reads += 1;
                thread::yield_now();
            }
            last_total
        });

        run(&mut engine, 600, FRAME);
        done.store(true, Ordering::Release);
        let observed = reader.join().expect("reader thread");
        assert!(observed <= engine.snapshot().total_particles);
    });

    assert_eq!(*handle.load(), *engine.snapshot());
    assert_eq!(*engine.snapshot(), engine.statistics().snapshot());
}

#[test]
fn equal_seeds_replay_identically() {
    let outcome = |seed: u64| {
        let config = EngineConfig {
            seed,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config, SimulationParameters::default()).expect("engine");
        run(&mut engine, 500, FRAME);
        engine.snapshot().histogram.clone()
    };
    assert_eq!(outcome(99), outcome(99));
}
