use crate::{Height, NilOrVal, Round, ValidatorId, Value, ValueId, VotingPower};

/// The three message kinds exchanged between validators. `Proposal` carries
/// the full value; `Prevote`/`Precommit` only ever carry a value identifier
/// or nil, so the type makes it impossible to accidentally attach a
/// `valid_round` to a vote or a hash to a proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Proposal {
        height: Height,
        round: Round,
        from: ValidatorId,
        value: Value,
        /// The round at which the proposer last saw `value` become valid,
        /// or `Round::NIL` if this is a fresh value.
        valid_round: Round,
        voting_power: VotingPower,
    },
    Prevote {
        height: Height,
        round: Round,
        from: ValidatorId,
        value: NilOrVal<ValueId>,
        voting_power: VotingPower,
    },
    Precommit {
        height: Height,
        round: Round,
        from: ValidatorId,
        value: NilOrVal<ValueId>,
        voting_power: VotingPower,
    },
}

/// The kind of a [`Message`], with no payload — convenient for logging and
/// for matching without destructuring the full variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Proposal,
    Prevote,
    Precommit,
}

impl core::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            MessageKind::Proposal => "PROPOSAL",
            MessageKind::Prevote => "PREVOTE",
            MessageKind::Precommit => "PRECOMMIT",
        };
        f.write_str(s)
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Proposal { .. } => MessageKind::Proposal,
            Message::Prevote { .. } => MessageKind::Prevote,
            Message::Precommit { .. } => MessageKind::Precommit,
        }
    }

    pub fn height(&self) -> Height {
        match self {
            Message::Proposal { height, .. }
            | Message::Prevote { height, .. }
            | Message::Precommit { height, .. } => *height,
        }
    }

    pub fn round(&self) -> Round {
        match self {
            Message::Proposal { round, .. }
            | Message::Prevote { round, .. }
            | Message::Precommit { round, .. } => *round,
        }
    }

    pub fn from(&self) -> &ValidatorId {
        match self {
            Message::Proposal { from, .. }
            | Message::Prevote { from, .. }
            | Message::Precommit { from, .. } => from,
        }
    }

    pub fn voting_power(&self) -> VotingPower {
        match self {
            Message::Proposal { voting_power, .. }
            | Message::Prevote { voting_power, .. }
            | Message::Precommit { voting_power, .. } => *voting_power,
        }
    }
}
