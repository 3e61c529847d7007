use std::time::Duration;

use tendersim_core_types::{Height, Round, Step};

/// Base durations and per-round growth for the three timeout kinds. Delays
/// scale linearly with round only — this simulator makes no adaptive
/// synchrony assumption.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub propose_base_ms: u64,
    pub prevote_base_ms: u64,
    pub precommit_base_ms: u64,
    pub delta_ms: u64,
}

impl TimeoutConfig {
    /// The delay to arm a `step` timeout for at `round`: `base + round * delta`.
    pub fn duration_for(&self, step: Step, round: Round) -> Duration {
        let base_ms = match step {
            Step::Propose => self.propose_base_ms,
            Step::Prevote => self.prevote_base_ms,
            Step::Precommit => self.precommit_base_ms,
        };
        let round = round.as_i64().max(0) as u64;
        Duration::from_millis(base_ms + round * self.delta_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            propose_base_ms: 200,
            prevote_base_ms: 200,
            precommit_base_ms: 200,
            delta_ms: 50,
        }
    }
}

/// A timeout alarm in flight, tagged with the `(height, round)` it was armed
/// for. At fire time the driver re-checks this against current state and
/// drops the alarm silently if state has moved on (`StaleTimeout`, §8).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeoutEvent {
    pub height: Height,
    pub round: Round,
    pub step: Step,
}
