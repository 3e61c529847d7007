use tendersim_core_types::ValidatorId;

/// Configuration faults, fatal at startup (§8: `ConfigurationError`).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("validator set must not be empty")]
    EmptyValidatorSet,

    #[error("validator `{0}` is configured more than once")]
    DuplicateValidator(ValidatorId),

    #[error("validator `{0}` has zero voting power")]
    ZeroVotingPower(ValidatorId),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
