use tokio::sync::{mpsc, watch};
use tracing::info;

use tendersim_core_types::{vid, Round, ValidatorId};
use tendersim_gossip::{Fabric, Inbox};

use crate::state::{Action, ValidatorState};
use crate::timeout::{TimeoutConfig, TimeoutEvent};

/// Drives one validator's [`ValidatorState`] against the gossip fabric.
///
/// This is the "one logically independent executor per validator" of §5:
/// the receive loop races the inbound queue, an internal timeout-event
/// channel, and a shared stop signal. All three are the only suspension
/// points; state is mutated only from inside this task, so `ValidatorState`
/// itself needs no internal locking.
pub struct Validator {
    state: ValidatorState,
    fabric: Fabric,
}

impl Validator {
    pub fn new(id: ValidatorId, fabric: Fabric, timeouts: TimeoutConfig) -> Self {
        let order = fabric.validators().to_vec();
        let power = fabric.power_map().clone();
        let state = ValidatorState::new(id, order, power, timeouts);
        Self { state, fabric }
    }

    pub fn state(&self) -> &ValidatorState {
        &self.state
    }

    /// Run the receive loop until `stop` is signalled `true`. `inbox` is the
    /// receiving half handed out by [`tendersim_gossip::FabricBuilder::register`]
    /// for this validator's id.
    pub async fn run(&mut self, mut inbox: Inbox, mut stop: watch::Receiver<bool>) {
        let (timeout_tx, mut timeout_rx) = mpsc::unbounded_channel::<TimeoutEvent>();

        let mut actions = Vec::new();
        self.state.start_round(Round::ZERO, &mut actions);
        self.perform(actions, &timeout_tx);

        loop {
            tokio::select! {
                biased;

                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }

                msg = inbox.recv() => {
                    let Some(msg) = msg else { break };
                    let mut actions = Vec::new();
                    self.state.handle_message(msg, &mut actions);
                    self.perform(actions, &timeout_tx);
                }

                event = timeout_rx.recv() => {
                    let Some(event) = event else { continue };
                    let mut actions = Vec::new();
                    self.state.handle_timeout(event, &mut actions);
                    self.perform(actions, &timeout_tx);
                }
            }
        }
    }

    /// Carry out the actions a state transition produced: broadcast
    /// messages over the fabric, and arm timeouts as independently spawned
    /// tasks that post back to `timeout_tx` — arming never blocks the main
    /// loop, matching §4.6/§4.8.
    fn perform(&self, actions: Vec<Action>, timeout_tx: &mpsc::UnboundedSender<TimeoutEvent>) {
        for action in actions {
            match action {
                Action::Broadcast(msg) => self.fabric.broadcast(&self.state.id, msg),
                Action::ScheduleTimeout(event, duration) => {
                    let tx = timeout_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(duration).await;
                        // A send error just means the validator task has
                        // already stopped; that's normal shutdown, not a
                        // fault worth reporting.
                        let _ = tx.send(event);
                    });
                }
                Action::Decided(height, value) => {
                    info!(
                        pid = %self.state.id, height = %height, vid = %vid(&value).short(),
                        "height decided"
                    );
                }
            }
        }
    }
}
