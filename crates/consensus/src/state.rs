use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, trace};

use tendersim_core_types::{
    vid, Height, Message, NilOrVal, Round, Step, ValidatorId, Value, ValueId, VotingPower,
};
use tendersim_core_votekeeper::{Quorum, Threshold, VoteKeeper};

use crate::error::InternalInvariantViolation;
use crate::proposer::proposer;
use crate::timeout::{TimeoutConfig, TimeoutEvent};

/// Something a [`ValidatorState`] transition wants the outside world to do.
/// The state machine itself is synchronous and side-effect free (easy to
/// unit test); [`crate::validator::Validator`] is the async driver that
/// actually performs these against the gossip fabric and the clock.
#[derive(Debug, Clone)]
pub enum Action {
    Broadcast(Message),
    ScheduleTimeout(TimeoutEvent, Duration),
    Decided(Height, Value),
}

fn short(value: NilOrVal<ValueId>) -> String {
    match value {
        NilOrVal::Nil => "nil".to_string(),
        NilOrVal::Val(id) => id.short(),
    }
}

/// One validator's exclusively-owned view of consensus: round driving,
/// proposal emission, weighted vote tallying, locking, and decision. See
/// the data model for the field-by-field lifecycle.
pub struct ValidatorState {
    pub id: ValidatorId,
    order: Vec<ValidatorId>,
    power: HashMap<ValidatorId, VotingPower>,
    quorum: Quorum,
    timeouts: TimeoutConfig,

    pub height: Height,
    pub round: Round,
    pub step: Step,

    pub locked_value: Option<Value>,
    pub locked_round: Round,
    pub valid_value: Option<Value>,
    pub valid_round: Round,

    pub decisions: HashMap<Height, Value>,

    prevotes: VoteKeeper,
    precommits: VoteKeeper,
    message_log: Vec<Message>,
}

impl ValidatorState {
    pub fn new(
        id: ValidatorId,
        order: Vec<ValidatorId>,
        power: HashMap<ValidatorId, VotingPower>,
        timeouts: TimeoutConfig,
    ) -> Self {
        let total = power.values().sum();
        Self {
            id,
            order,
            power,
            quorum: Quorum::new(total),
            timeouts,
            height: Height::INITIAL,
            round: Round::NIL,
            step: Step::Propose,
            locked_value: None,
            locked_round: Round::NIL,
            valid_value: None,
            valid_round: Round::NIL,
            decisions: HashMap::new(),
            prevotes: VoteKeeper::new(),
            precommits: VoteKeeper::new(),
            message_log: Vec::new(),
        }
    }

    fn my_power(&self) -> VotingPower {
        self.power[&self.id]
    }

    fn arm(&self, step: Step, actions: &mut Vec<Action>) {
        let event = TimeoutEvent {
            height: self.height,
            round: self.round,
            step,
        };
        let duration = self.timeouts.duration_for(step, self.round);
        actions.push(Action::ScheduleTimeout(event, duration));
    }

    /// A freshly-minted, unique non-nil value: consensus coordinates plus a
    /// random nonce are enough, since nothing in this simulator interprets
    /// the bytes beyond their hash.
    fn fresh_value(&self) -> Value {
        let mut bytes = Vec::with_capacity(24 + self.id.as_str().len());
        bytes.extend_from_slice(&self.height.as_u64().to_be_bytes());
        bytes.extend_from_slice(&self.round.as_i64().to_be_bytes());
        bytes.extend_from_slice(self.id.as_str().as_bytes());
        let nonce: u64 = rand::thread_rng().gen();
        bytes.extend_from_slice(&nonce.to_be_bytes());
        Value::new(bytes)
    }

    fn broadcast_prevote(&self, value: NilOrVal<ValueId>, actions: &mut Vec<Action>) {
        info!(
            pid = %self.id, phase = "PREVOTE", height = %self.height, round = %self.round,
            vid = %short(value), "sending prevote"
        );
        actions.push(Action::Broadcast(Message::Prevote {
            height: self.height,
            round: self.round,
            from: self.id.clone(),
            value,
            voting_power: self.my_power(),
        }));
    }

    fn broadcast_precommit(&self, value: NilOrVal<ValueId>, actions: &mut Vec<Action>) {
        info!(
            pid = %self.id, phase = "PRECOMMIT", height = %self.height, round = %self.round,
            vid = %short(value), "sending precommit"
        );
        actions.push(Action::Broadcast(Message::Precommit {
            height: self.height,
            round: self.round,
            from: self.id.clone(),
            value,
            voting_power: self.my_power(),
        }));
    }

    /// `start_round(r)`: set `round <- r`, `step <- Propose`, propose if we
    /// are the proposer for `(H, r)`, and arm the propose timeout.
    pub fn start_round(&mut self, r: Round, actions: &mut Vec<Action>) {
        self.round = r;
        self.step = Step::Propose;
        debug!(pid = %self.id, height = %self.height, round = %r, "round started");

        let proposer = proposer(&self.order, &self.power, self.height, r);
        if *proposer == self.id {
            let (value, valid_round) = match &self.valid_value {
                Some(v) => (v.clone(), self.valid_round),
                None => (self.fresh_value(), Round::NIL),
            };

            info!(
                pid = %self.id, phase = "PROPOSAL", height = %self.height, round = %r,
                vid = %vid(&value).short(), "sending proposal"
            );

            actions.push(Action::Broadcast(Message::Proposal {
                height: self.height,
                round: r,
                from: self.id.clone(),
                value,
                valid_round,
                voting_power: self.my_power(),
            }));
        }

        self.arm(Step::Propose, actions);
    }

    /// Backward scan of the current height's message log for a PROPOSAL at
    /// `round` whose value hashes to `id`. Mirrors the votekeeper resolving
    /// a vote identifier back to the value it refers to.
    fn find_proposal(&self, round: Round, id: ValueId) -> Option<Value> {
        self.message_log.iter().rev().find_map(|m| match m {
            Message::Proposal { round: r, value, .. } if *r == round && vid(value) == id => {
                Some(value.clone())
            }
            _ => None,
        })
    }

    /// Dispatch a dequeued message: log it (if it belongs to the current
    /// height) and act on its kind. Messages for a different height are
    /// `StaleMessage` by definition and are dropped without being logged.
    pub fn handle_message(&mut self, msg: Message, actions: &mut Vec<Action>) {
        if msg.height() != self.height {
            trace!(
                pid = %self.id, message_height = %msg.height(), height = %self.height,
                "dropping stale message for a different height"
            );
            return;
        }

        self.message_log.push(msg.clone());

        match msg {
            Message::Proposal {
                round,
                value,
                valid_round,
                ..
            } => self.on_proposal(round, value, valid_round, actions),
            Message::Prevote {
                round,
                value,
                voting_power,
                ..
            } => self.on_prevote(round, value, voting_power, actions),
            Message::Precommit {
                round,
                value,
                voting_power,
                ..
            } => self.on_precommit(round, value, voting_power, actions),
        }
    }

    fn on_proposal(
        &mut self,
        round: Round,
        value: Value,
        _valid_round: Round,
        actions: &mut Vec<Action>,
    ) {
        let id = vid(&value);

        if round == self.round && self.step == Step::Propose {
            let prevote_value = if self.locked_round.is_nil() || self.locked_value.as_ref() == Some(&value)
            {
                NilOrVal::Val(id)
            } else {
                NilOrVal::Nil
            };
            self.broadcast_prevote(prevote_value, actions);
            self.step = Step::Prevote;
            self.arm(Step::Prevote, actions);
        } else {
            trace!(
                pid = %self.id, proposal_round = %round, round = %self.round, step = ?self.step,
                "proposal does not match current (round, step); logged only"
            );
        }

        // Deferred-resolution retry: a prevote quorum for this value at
        // `round` may already have been reached before this proposal
        // arrived. Re-check it now that the proposal is resolvable.
        self.try_precommit_from_prevote_quorum(round, NilOrVal::Val(id), actions);
    }

    fn on_prevote(
        &mut self,
        round: Round,
        value: NilOrVal<ValueId>,
        voting_power: VotingPower,
        actions: &mut Vec<Action>,
    ) {
        self.prevotes.record(self.height, round, value, voting_power);
        self.try_precommit_from_prevote_quorum(round, value, actions);
    }

    /// If `step <= Prevote` and `value` has reached quorum at `round`, try to
    /// resolve it against the message log and transition to locked/Precommit.
    /// If the matching proposal hasn't arrived yet this is a no-op; it will
    /// be retried the next time a PROPOSAL for this round is logged.
    fn try_precommit_from_prevote_quorum(
        &mut self,
        round: Round,
        value: NilOrVal<ValueId>,
        actions: &mut Vec<Action>,
    ) {
        if self.step > Step::Prevote {
            // Subsumes both `step <= Prevote` and `step != Precommit` from
            // the design: Precommit is strictly greater than Prevote.
            return;
        }

        let id = match self.prevotes.threshold(&self.quorum, self.height, round, value) {
            Threshold::Value(id) => id,
            Threshold::Nil | Threshold::Unreached => return,
        };

        let Some(v) = self.find_proposal(round, id) else {
            trace!(
                pid = %self.id, round = %round, vid = %id.short(),
                "prevote quorum reached but proposal unresolved; deferring"
            );
            return;
        };

        self.locked_value = Some(v.clone());
        self.locked_round = self.round;
        self.valid_value = Some(v);
        self.valid_round = self.round;
        self.check_lock_consistency();

        info!(pid = %self.id, vid = %id.short(), round = %self.round, "LOCKED");

        self.broadcast_precommit(NilOrVal::Val(id), actions);
        self.step = Step::Precommit;
        self.arm(Step::Precommit, actions);
    }

    /// (I-invariant, §3/§8): `locked_value` and `locked_round` must agree on
    /// nil-ness. A mismatch means this validator's own bookkeeping is
    /// corrupt, not that it observed anything unusual on the wire.
    fn check_lock_consistency(&self) {
        if self.locked_value.is_none() != self.locked_round.is_nil() {
            panic!("{}", InternalInvariantViolation::LockInconsistent);
        }
    }

    fn on_precommit(
        &mut self,
        round: Round,
        value: NilOrVal<ValueId>,
        voting_power: VotingPower,
        actions: &mut Vec<Action>,
    ) {
        self.precommits.record(self.height, round, value, voting_power);

        if self.decisions.contains_key(&self.height) {
            return;
        }

        let id = match self.precommits.threshold(&self.quorum, self.height, round, value) {
            Threshold::Value(id) => id,
            Threshold::Nil | Threshold::Unreached => return,
        };

        let Some(v) = self.find_proposal(round, id) else {
            trace!(
                pid = %self.id, round = %round, vid = %id.short(),
                "precommit quorum reached but proposal unresolved; deferring"
            );
            return;
        };

        self.decide(v, actions);
    }

    fn decide(&mut self, value: Value, actions: &mut Vec<Action>) {
        let decided_height = self.height;
        let decided_round = self.round;
        let decided_id = vid(&value);

        info!(
            pid = %self.id, vid = %decided_id.short(), height = %decided_height, round = %decided_round,
            "DECIDED"
        );

        if self.decisions.insert(decided_height, value.clone()).is_some() {
            panic!(
                "{}",
                InternalInvariantViolation::DecisionOverwritten {
                    height: decided_height.as_u64(),
                }
            );
        }
        actions.push(Action::Decided(decided_height, value));

        let next_height = decided_height.increment();
        if next_height.as_u64() <= self.height.as_u64() {
            panic!(
                "{}",
                InternalInvariantViolation::HeightRegressed {
                    from: self.height.as_u64(),
                    to: next_height.as_u64(),
                }
            );
        }
        self.height = next_height;
        self.round = Round::NIL;
        self.step = Step::Propose;
        self.locked_value = None;
        self.locked_round = Round::NIL;
        self.valid_value = None;
        self.valid_round = Round::NIL;
        self.check_lock_consistency();
        self.prevotes.clear();
        self.precommits.clear();
        self.message_log.clear();

        self.start_round(Round::ZERO, actions);
    }

    /// Handle a fired timeout alarm. Dropped as a `StaleTimeout` if the
    /// `(height, round)` it was armed for no longer matches current state.
    pub fn handle_timeout(&mut self, event: TimeoutEvent, actions: &mut Vec<Action>) {
        if event.height != self.height || event.round != self.round {
            trace!(pid = %self.id, ?event, "dropping stale timeout");
            return;
        }

        match event.step {
            Step::Propose => {
                if self.step != Step::Propose {
                    trace!(pid = %self.id, ?event, "dropping stale propose timeout");
                    return;
                }
                self.broadcast_prevote(NilOrVal::Nil, actions);
                self.step = Step::Prevote;
                self.arm(Step::Prevote, actions);
            }
            Step::Prevote => {
                if self.step != Step::Prevote {
                    trace!(pid = %self.id, ?event, "dropping stale prevote timeout");
                    return;
                }
                self.broadcast_precommit(NilOrVal::Nil, actions);
                self.step = Step::Precommit;
                self.arm(Step::Precommit, actions);
            }
            Step::Precommit => {
                // Fires regardless of step, as long as (height, round) match.
                let next = self.round.increment();
                self.start_round(next, actions);
            }
        }
    }
}
