use tendersim_core_types::{ValueId, VotingPower};

/// Fault-tolerance and quorum arithmetic over a fixed total voting power `N`.
///
/// `f = floor((N - 1) / 3)` is the maximum weighted power of validators the
/// protocol tolerates being faulty; `q = 2f + 1` is the weighted power a
/// tally must reach to be considered a quorum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quorum {
    total: VotingPower,
}

impl Quorum {
    pub const fn new(total: VotingPower) -> Self {
        Self { total }
    }

    pub const fn total(&self) -> VotingPower {
        self.total
    }

    pub const fn f(&self) -> VotingPower {
        (self.total - 1) / 3
    }

    pub const fn q(&self) -> VotingPower {
        2 * self.f() + 1
    }

    /// Whether `tally` meets or exceeds the quorum threshold `q`.
    pub const fn is_met(&self, tally: VotingPower) -> bool {
        tally >= self.q()
    }
}

/// The outcome of comparing a vote tally against the quorum threshold, named
/// after what a validator would act on rather than the raw number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Threshold {
    /// No identifier has reached `q` yet.
    Unreached,
    /// `nil` reached `q`.
    Nil,
    /// A concrete value reached `q`.
    Value(ValueId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quorum_arithmetic_matches_reference_cases() {
        assert_eq!(Quorum::new(5).f(), 1);
        assert_eq!(Quorum::new(5).q(), 3);

        assert_eq!(Quorum::new(4).f(), 1);
        assert_eq!(Quorum::new(4).q(), 3);

        assert_eq!(Quorum::new(7).f(), 2);
        assert_eq!(Quorum::new(7).q(), 5);
    }

    #[test]
    fn is_met_is_inclusive_at_q() {
        let quorum = Quorum::new(5);
        assert!(!quorum.is_met(2));
        assert!(quorum.is_met(3));
        assert!(quorum.is_met(4));
    }
}
