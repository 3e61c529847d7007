use std::collections::HashMap;

use tendersim_core_types::{Height, Round, ValidatorId, VotingPower};

/// Deterministic, stateless, power-weighted round-robin proposer selection.
///
/// Conceptually, expand `power` into a flat list in `order` (repeating each
/// id `power[id]` times) and index into it at
/// `(height * 1_000_003 + round) mod len(list)`. This walks the power map
/// directly instead of materializing that list, which would be wasteful for
/// large voting powers, but returns the identical element.
pub fn proposer<'a>(
    order: &'a [ValidatorId],
    power: &HashMap<ValidatorId, VotingPower>,
    height: Height,
    round: Round,
) -> &'a ValidatorId {
    debug_assert!(!order.is_empty(), "proposer selection needs a validator set");
    debug_assert!(!round.is_nil(), "proposer selection needs a concrete round");

    let total: VotingPower = order.iter().map(|id| power[id]).sum();
    let coord = height
        .as_u64()
        .wrapping_mul(1_000_003)
        .wrapping_add(round.as_i64() as u64);
    let mut index = coord % total;

    for id in order {
        let weight = power[id];
        if index < weight {
            return id;
        }
        index -= weight;
    }

    unreachable!("index is bounded by total voting power")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set() -> (Vec<ValidatorId>, HashMap<ValidatorId, VotingPower>) {
        let order = vec![
            ValidatorId::new("a"),
            ValidatorId::new("b"),
            ValidatorId::new("c"),
            ValidatorId::new("d"),
        ];
        let power = HashMap::from([
            (ValidatorId::new("a"), 2),
            (ValidatorId::new("b"), 1),
            (ValidatorId::new("c"), 1),
            (ValidatorId::new("d"), 1),
        ]);
        (order, power)
    }

    #[test]
    fn is_deterministic_for_fixed_coordinates() {
        let (order, power) = set();
        let p1 = proposer(&order, &power, Height::new(3), Round::new(2));
        let p2 = proposer(&order, &power, Height::new(3), Round::new(2));
        assert_eq!(p1, p2);
    }

    #[test]
    fn matches_reference_index_formula() {
        let (order, power) = set();
        // total power 5, coord = 0*1_000_003 + 0 = 0 -> index 0 -> "a" (weight 2 covers 0,1)
        assert_eq!(proposer(&order, &power, Height::new(0), Round::new(0)).as_str(), "a");
    }

    #[test]
    fn honors_weighted_repetition() {
        let order = vec![ValidatorId::new("a"), ValidatorId::new("b")];
        let power = HashMap::from([(ValidatorId::new("a"), 3), (ValidatorId::new("b"), 1)]);
        // flat list is [a, a, a, b]; index 3 mod 4 = 3 -> "b"
        assert_eq!(
            proposer(&order, &power, Height::new(0), Round::new(3)).as_str(),
            "b"
        );
    }
}
