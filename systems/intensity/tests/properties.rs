use double_slit_core::{SimulationParameters, SCREEN_HALF_WIDTH};
use double_slit_system_intensity::{
    density, fringe_spacing, fringe_visibility, intensity, theoretical_curve,
};

fn parameter_grid() -> Vec<SimulationParameters> {
    let mut grid = Vec::new();
    for wavelength_nm in [380.0, 450.0, 550.0, 650.0, 780.0] {
        for (slit_distance_mm, slit_width_mm) in [(0.01, 0.005), (0.3, 0.05), (1.0, 0.4)] {
            for barrier_thickness_mm in [0.01, 0.1, 1.0] {
                for coherence in [0.0, 0.5, 1.0] {
                    for detector_active in [false, true] {
                        grid.push(SimulationParameters {
                            wavelength_nm,
                            slit_distance_mm,
                            slit_width_mm,
                            barrier_thickness_mm,
                            coherence,
                            detector_active,
                            ..SimulationParameters::default()
                        });
                    }
                }
            }
        }
    }
    grid
}

fn screen_offsets() -> impl Iterator<Item = f64> {
    (0..=400).map(|index| -SCREEN_HALF_WIDTH + index as f64 * 0.025)
}

#[test]
fn intensity_stays_within_unit_interval() {
    for parameters in parameter_grid() {
        assert_eq!(parameters.validate(), Ok(()));
        for z in screen_offsets() {
            let value = density(z, &parameters);
            assert!(
                (0.0..=1.0).contains(&value),
                "density {value} out of bounds at z = {z} for {parameters:?}"
            );
        }
    }
}

#[test]
fn intensity_is_mirror_symmetric() {
    for parameters in parameter_grid() {
        for z in screen_offsets() {
            let left = density(-z, &parameters);
            let right = density(z, &parameters);
            assert!(
                (left - right).abs() < 1e-12,
                "asymmetry at z = {z}: {left} vs {right}"
            );
        }
    }
}

#[test]
fn centre_of_screen_is_well_defined() {
    for parameters in parameter_grid() {
        let value = intensity(0.0, &parameters);
        assert!(value.is_finite(), "intensity(0) is not finite");
    }
}

#[test]
fn visibility_never_drops_as_coherence_rises() {
    for wavelength_nm in [400.0, 550.0, 700.0] {
        let mut previous = -1.0;
        for step in 0..=20 {
            let parameters = SimulationParameters {
                wavelength_nm,
                coherence: f64::from(step) / 20.0,
                ..SimulationParameters::default()
            };
            let visibility = fringe_visibility(&parameters);
            assert!(
                visibility + 1e-12 >= previous,
                "visibility fell from {previous} to {visibility} at coherence {}",
                parameters.coherence
            );
            previous = visibility;
        }
        assert!(previous > 0.9, "ideal coherence should give crisp fringes");
    }
}

#[test]
fn incoherent_light_washes_out_fringes() {
    let parameters = SimulationParameters {
        coherence: 0.0,
        ..SimulationParameters::default()
    };
    assert!(fringe_visibility(&parameters) < 0.05);
}

#[test]
fn bright_fringes_repeat_at_the_predicted_spacing() {
    let parameters = SimulationParameters::default();
    let spacing = fringe_spacing(&parameters).expect("finite spacing");
    let first_order = intensity(spacing, &parameters);
    let half_order = intensity(0.5 * spacing, &parameters);
    assert!(first_order > 0.5, "first order too dim: {first_order}");
    assert!(half_order < 1e-6, "half order should be dark: {half_order}");
}

#[test]
fn classical_curve_has_two_separated_modes() {
    let parameters = SimulationParameters {
        detector_active: true,
        ..SimulationParameters::default()
    };
    let curve = theoretical_curve(&parameters, 201);
    let maxima: Vec<f64> = curve
        .windows(3)
        .filter(|window| {
            window[1].intensity > window[0].intensity
                && window[1].intensity >= window[2].intensity
                && window[1].intensity > 0.5
        })
        .map(|window| window[1].position)
        .collect();
    assert_eq!(maxima.len(), 2, "expected two bands, found {maxima:?}");
    assert!(maxima[0] < -1.0 && maxima[1] > 1.0);
}
