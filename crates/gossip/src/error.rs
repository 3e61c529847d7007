use tendersim_core_types::ValidatorId;

/// Fabric-level faults. These are all programmer errors — misuse of the
/// registration protocol — rather than anomalies arising from the run
/// itself, so callers are expected to treat them as fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum GossipError {
    #[error("validator `{0}` is already registered with this gossip fabric")]
    DuplicateValidator(ValidatorId),

    #[error("cannot build a gossip fabric with no registered validators")]
    EmptyValidatorSet,
}
