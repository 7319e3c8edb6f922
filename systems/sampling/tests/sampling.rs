use double_slit_core::{SamplerConfig, SimulationParameters, Slit, SCREEN_HALF_WIDTH};
use double_slit_system_intensity::fringe_spacing;
use double_slit_system_sampling::{sample_band, PositionSampler, SampleOutcome};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

#[test]
fn samples_always_land_on_the_screen() {
    let sampler = PositionSampler::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0xfeed);
    for detector_active in [false, true] {
        let parameters = SimulationParameters {
            detector_active,
            ..SimulationParameters::default()
        };
        for _ in 0..2_000 {
            let sample = sampler.sample(&parameters, &mut rng);
            assert!(sample.position.is_finite());
            assert!(sample.position.abs() <= SCREEN_HALF_WIDTH);
            assert!(sample.attempts <= sampler.max_attempts());
        }
    }
}

#[test]
fn pathological_density_exhausts_budget_and_falls_back() {
    // A vanishing beam leaves no acceptance mass anywhere but the exact centre.
    let parameters = SimulationParameters {
        beam_width: 1e-6,
        ..SimulationParameters::default()
    };
    let sampler = PositionSampler::new(SamplerConfig {
        max_attempts: 40,
        acceptance_floor: 0.0,
    });
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for _ in 0..50 {
        let sample = sampler.sample(&parameters, &mut rng);
        assert_eq!(sample.outcome, SampleOutcome::Fallback);
        assert_eq!(sample.attempts, 40);
        assert_eq!(sample.position, 0.0);
    }
}

#[test]
fn interference_samples_are_balanced_around_the_centre() {
    let parameters = SimulationParameters::default();
    let sampler = PositionSampler::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let samples: Vec<f64> = (0..4_000)
        .map(|_| sampler.sample(&parameters, &mut rng).position)
        .collect();
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    assert!(mean.abs() < 0.2, "mean drifted to {mean}");

    let spacing = fringe_spacing(&parameters).expect("spacing");
    let near_bright = samples
        .iter()
        .filter(|z| {
            let phase = (*z / spacing).fract().abs();
            phase < 0.25 || phase > 0.75
        })
        .count();
    assert!(
        near_bright as f64 > 0.7 * samples.len() as f64,
        "only {near_bright} of {} samples near bright fringes",
        samples.len()
    );
}

#[test]
fn detector_samples_split_into_two_bands() {
    let parameters = SimulationParameters {
        detector_active: true,
        ..SimulationParameters::default()
    };
    let sampler = PositionSampler::default();
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    let samples: Vec<f64> = (0..2_000)
        .map(|_| sampler.sample(&parameters, &mut rng).position)
        .collect();
    let central = samples.iter().filter(|z| z.abs() < 0.3).count();
    let banded = samples
        .iter()
        .filter(|z| (z.abs() - 1.5).abs() < 0.9)
        .count();
    assert!(central < samples.len() / 10, "{central} samples in the dark centre");
    assert!(banded > samples.len() * 3 / 4, "only {banded} samples in the bands");
}

#[test]
fn band_draws_cluster_behind_the_chosen_slit() {
    let parameters = SimulationParameters::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let upper: Vec<f64> = (0..1_000)
        .map(|_| sample_band(&parameters, Slit::Upper, &mut rng))
        .collect();
    let lower: Vec<f64> = (0..1_000)
        .map(|_| sample_band(&parameters, Slit::Lower, &mut rng))
        .collect();

    let upper_mean = upper.iter().sum::<f64>() / upper.len() as f64;
    let lower_mean = lower.iter().sum::<f64>() / lower.len() as f64;
    assert!((upper_mean - 1.5).abs() < 0.1, "upper band at {upper_mean}");
    assert!((lower_mean + 1.5).abs() < 0.1, "lower band at {lower_mean}");
    assert!(upper
        .iter()
        .chain(lower.iter())
        .all(|z| z.abs() <= SCREEN_HALF_WIDTH));
}
