use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{RawScenario, ScenarioInputError, ScenarioSet, default_scenarios};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid scenario file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A set of scenarios as JSON, shared by the CLI and the HTTP API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub scenarios: Vec<RawScenario>,
}

impl ScenarioFile {
    pub fn defaults() -> Self {
        Self {
            scenarios: default_scenarios().iter().map(RawScenario::from).collect(),
        }
    }

    pub fn into_scenario_set(self) -> Result<ScenarioSet, ScenarioInputError> {
        let scenarios = self
            .scenarios
            .into_iter()
            .enumerate()
            .map(|(position, raw)| raw.into_scenario(position))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScenarioSet::new(scenarios))
    }
}

pub fn load_scenario_file(path: &Path) -> Result<ScenarioFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
