use std::{fs, path::Path};

use anyhow::{Context, Result};
use double_slit_core::{EngineConfig, SimulationParameters};
use serde::Deserialize;

/// Engine tuning and starting parameters read from a TOML run file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunFile {
    /// Engine configuration; missing keys keep their defaults.
    pub(crate) engine: EngineConfig,
    /// Starting parameters; missing keys keep their defaults.
    pub(crate) parameters: SimulationParameters,
}

impl RunFile {
    /// Loads the run file at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read run file at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid run file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let run: Self = toml::from_str(contents).context("failed to parse run file toml contents")?;
        run.engine
            .validate()
            .context("`[engine]` table holds an unusable value")?;
        Ok(run)
    }
}
