/// Invariants from the data model (§3) whose violation means the validator's
/// own bookkeeping is corrupt rather than that it observed something unusual
/// on the wire. Unlike the stale-message/stale-timeout cases handled inline in
/// [`crate::state::ValidatorState`], which are routine and silently dropped,
/// these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum InternalInvariantViolation {
    #[error("height regressed from {from} to {to}")]
    HeightRegressed { from: u64, to: u64 },

    #[error("locked_value and locked_round disagree on nil-ness")]
    LockInconsistent,

    #[error("decision for height {height} was overwritten")]
    DecisionOverwritten { height: u64 },
}
