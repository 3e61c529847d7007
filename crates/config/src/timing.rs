use serde::{Deserialize, Serialize};

/// Timeout bases and per-round growth, plus gossip jitter bounds. Mirrors
/// the reference constants from the design: 200ms propose/prevote/precommit
/// bases, 50ms round growth, 10-50ms gossip delay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub propose_base_ms: u64,
    pub prevote_base_ms: u64,
    pub precommit_base_ms: u64,
    pub delta_ms: u64,
    pub gossip_min_delay_ms: u64,
    pub gossip_max_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            propose_base_ms: 200,
            prevote_base_ms: 200,
            precommit_base_ms: 200,
            delta_ms: 50,
            gossip_min_delay_ms: 10,
            gossip_max_delay_ms: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_matches_reference_constants() {
        let timing = TimingConfig::default();
        assert_eq!(timing.propose_base_ms, 200);
        assert_eq!(timing.delta_ms, 50);
        assert_eq!(timing.gossip_min_delay_ms, 10);
        assert_eq!(timing.gossip_max_delay_ms, 50);
    }
}
