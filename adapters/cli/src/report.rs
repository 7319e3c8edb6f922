use std::fmt::{self, Write as _};

use double_slit_core::{RunCounters, StatisticsSnapshot};

/// Renders the statistics readout followed by a horizontal histogram.
pub(crate) fn render(
    snapshot: &StatisticsSnapshot,
    counters: &RunCounters,
    bar_width: usize,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let parameters = &snapshot.parameters;
    let color = parameters.color();

    writeln!(
        out,
        "λ = {:.0} nm (#{:02x}{:02x}{:02x})  d = {:.3} mm  a = {:.3} mm  t = {:.2} mm",
        parameters.wavelength_nm,
        color.red(),
        color.green(),
        color.blue(),
        parameters.slit_distance_mm,
        parameters.slit_width_mm,
        parameters.barrier_thickness_mm,
    )?;
    writeln!(
        out,
        "coherence {:.0}%  transmission {:.0}%  detector {}",
        parameters.coherence * 100.0,
        parameters.transmission_efficiency * 100.0,
        if parameters.detector_active { "on" } else { "off" },
    )?;
    writeln!(
        out,
        "spawned {}  hits {}  lost {} ({:.1}%)  suppressed {}  fallbacks {}",
        counters.spawned,
        snapshot.total_particles,
        snapshot.lost_particles,
        snapshot.loss_ratio() * 100.0,
        counters.suppressed,
        counters.fallbacks,
    )?;
    writeln!(
        out,
        "fringes {} (expected {})  contrast {:.3}  R² {:.3}",
        snapshot.fringe_count,
        snapshot.expected_fringe_count,
        snapshot.contrast,
        snapshot.fit_quality,
    )?;
    writeln!(
        out,
        "mean {:.2}  σ {:.2}  skew {:.3}  excess kurtosis {:.3}",
        snapshot.mean, snapshot.std_dev, snapshot.skewness, snapshot.kurtosis,
    )?;
    writeln!(out)?;

    let peak = snapshot.histogram.iter().copied().max().unwrap_or(0);
    for (index, count) in snapshot.histogram.iter().enumerate() {
        let length = if peak == 0 {
            0
        } else {
            (*count as f64 / peak as f64 * bar_width as f64).round() as usize
        };
        writeln!(
            out,
            "{:>6.2} |{:<width$}| {}",
            snapshot.bin_center(index),
            "#".repeat(length),
            count,
            width = bar_width,
        )?;
    }

    Ok(out)
}
