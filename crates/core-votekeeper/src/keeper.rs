use std::collections::HashMap;

use tendersim_core_types::{Height, NilOrVal, Round, ValueId, VotingPower};

use crate::threshold::{Quorum, Threshold};

/// A weighted tally of votes of one kind (prevotes, or precommits), keyed by
/// the `(height, round, value-or-nil)` triple they were cast for.
///
/// Per (I5), a sender's voting power is added on every vote observed for a
/// key, with no deduplication by sender — a deliberate, spec-mandated
/// property of this simulator's vote counting, not an oversight.
#[derive(Debug, Default)]
pub struct VoteKeeper {
    tallies: HashMap<(Height, Round, NilOrVal<ValueId>), VotingPower>,
}

impl VoteKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote for `value` at `(height, round)`, adding `power` to its
    /// running tally, and return the tally's new total.
    pub fn record(
        &mut self,
        height: Height,
        round: Round,
        value: NilOrVal<ValueId>,
        power: VotingPower,
    ) -> VotingPower {
        let tally = self.tallies.entry((height, round, value)).or_insert(0);
        *tally += power;
        *tally
    }

    /// The current tally for a key, without recording anything.
    pub fn tally(&self, height: Height, round: Round, value: NilOrVal<ValueId>) -> VotingPower {
        self.tallies
            .get(&(height, round, value))
            .copied()
            .unwrap_or(0)
    }

    /// Drop every tally, for a height advance.
    pub fn clear(&mut self) {
        self.tallies.clear();
    }

    /// Resolve `value`'s tally at `(height, round)` against `quorum`: `Unreached`
    /// until it's met, then `Nil` or `Value(id)` according to what `value` was.
    pub fn threshold(
        &self,
        quorum: &Quorum,
        height: Height,
        round: Round,
        value: NilOrVal<ValueId>,
    ) -> Threshold {
        if !quorum.is_met(self.tally(height, round, value)) {
            return Threshold::Unreached;
        }
        match value {
            NilOrVal::Nil => Threshold::Nil,
            NilOrVal::Val(id) => Threshold::Value(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn h(n: u64) -> Height {
        Height::new(n)
    }

    fn r(n: i64) -> Round {
        Round::new(n)
    }

    #[test]
    fn distinct_values_tally_independently() {
        let mut keeper = VoteKeeper::new();
        let x = NilOrVal::Val(ValueId::new([1; 32]));
        let y = NilOrVal::Val(ValueId::new([2; 32]));

        keeper.record(h(0), r(0), x, 2);
        keeper.record(h(0), r(0), y, 5);

        assert_eq!(keeper.tally(h(0), r(0), x), 2);
        assert_eq!(keeper.tally(h(0), r(0), y), 5);
    }

    #[test]
    fn record_sums_every_vote_without_dedup() {
        let mut keeper = VoteKeeper::new();
        let x = NilOrVal::Val(ValueId::new([7; 32]));

        keeper.record(h(0), r(0), x, 1);
        keeper.record(h(0), r(0), x, 1);

        assert_eq!(keeper.tally(h(0), r(0), x), 2);
    }

    #[test]
    fn clear_drops_all_heights_and_rounds() {
        let mut keeper = VoteKeeper::new();
        let x = NilOrVal::Val(ValueId::new([9; 32]));
        keeper.record(h(0), r(0), x, 3);
        keeper.clear();
        assert_eq!(keeper.tally(h(0), r(0), x), 0);
    }

    #[test]
    fn threshold_resolves_once_quorum_is_met() {
        let mut keeper = VoteKeeper::new();
        let quorum = Quorum::new(5);
        let x = NilOrVal::Val(ValueId::new([1; 32]));

        keeper.record(h(0), r(0), x, 2);
        assert_eq!(keeper.threshold(&quorum, h(0), r(0), x), Threshold::Unreached);

        keeper.record(h(0), r(0), x, 1);
        assert!(matches!(
            keeper.threshold(&quorum, h(0), r(0), x),
            Threshold::Value(id) if id == ValueId::new([1; 32])
        ));
    }

    #[test]
    fn threshold_resolves_nil() {
        let mut keeper = VoteKeeper::new();
        let quorum = Quorum::new(5);

        keeper.record(h(0), r(0), NilOrVal::Nil, 3);
        assert_eq!(keeper.threshold(&quorum, h(0), r(0), NilOrVal::Nil), Threshold::Nil);
    }
}
