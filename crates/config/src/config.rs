use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tendersim_core_types::{ValidatorId, VotingPower};

use crate::error::ConfigError;
use crate::timing::TimingConfig;

/// One validator's entry in a [`Config`]'s validator set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub id: ValidatorId,
    pub voting_power: VotingPower,
}

/// A complete run configuration: the validator set (in the order proposer
/// selection expands it in), timing parameters, and how long the demo runs
/// before shutting down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub validators: Vec<ValidatorConfig>,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(with = "humantime_serde", default = "default_run_duration")]
    pub run_duration: Duration,
}

fn default_run_duration() -> Duration {
    Duration::from_secs(10)
}

impl Config {
    /// The built-in four-validator demo: powers 2, 1, 1, 1 (total 5, f = 1,
    /// Q = 3), run for 10 seconds.
    pub fn demo() -> Self {
        Self {
            validators: vec![
                ValidatorConfig {
                    id: ValidatorId::new("A"),
                    voting_power: 2,
                },
                ValidatorConfig {
                    id: ValidatorId::new("B"),
                    voting_power: 1,
                },
                ValidatorConfig {
                    id: ValidatorId::new("C"),
                    voting_power: 1,
                },
                ValidatorConfig {
                    id: ValidatorId::new("D"),
                    voting_power: 1,
                },
            ],
            timing: TimingConfig::default(),
            run_duration: default_run_duration(),
        }
    }

    /// Parse a config from TOML text and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject an empty validator set, duplicate validator ids, or zero
    /// voting power (§8: `ConfigurationError`, fatal at startup).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validators.is_empty() {
            return Err(ConfigError::EmptyValidatorSet);
        }

        let mut seen = HashSet::with_capacity(self.validators.len());
        for v in &self.validators {
            if v.voting_power == 0 {
                return Err(ConfigError::ZeroVotingPower(v.id.clone()));
            }
            if !seen.insert(v.id.clone()) {
                return Err(ConfigError::DuplicateValidator(v.id.clone()));
            }
        }

        Ok(())
    }
}
