use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::trace;

use tendersim_core_types::{Message, ValidatorId, VotingPower};

use crate::error::GossipError;

/// The receiving half of a validator's inbound queue, handed out once by
/// [`FabricBuilder::register`].
pub type Inbox = mpsc::UnboundedReceiver<Message>;

/// Default uniform delay window, in milliseconds, applied independently to
/// every `send` unless overridden with [`FabricBuilder::delay_range`].
const DEFAULT_MIN_DELAY_MS: u64 = 10;
const DEFAULT_MAX_DELAY_MS: u64 = 50;

/// Accumulates validator registrations before the run starts. Registration
/// order is load-bearing: it is the order proposer selection (§4.3 of the
/// design) expands the power-map in.
pub struct FabricBuilder {
    senders: HashMap<ValidatorId, mpsc::UnboundedSender<Message>>,
    power: HashMap<ValidatorId, VotingPower>,
    order: Vec<ValidatorId>,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl Default for FabricBuilder {
    fn default() -> Self {
        Self {
            senders: HashMap::new(),
            power: HashMap::new(),
            order: Vec::new(),
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl FabricBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the uniform gossip delay window (default `[10ms, 50ms]`).
    pub fn delay_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms;
        self.max_delay_ms = max_ms;
        self
    }

    /// Create an inbound queue for `id` with the given `power`, returning its
    /// receiving half. Registering the same id twice is a [`GossipError`].
    pub fn register(&mut self, id: ValidatorId, power: VotingPower) -> Result<Inbox, GossipError> {
        if self.senders.contains_key(&id) {
            return Err(GossipError::DuplicateValidator(id));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.order.push(id.clone());
        self.power.insert(id.clone(), power);
        self.senders.insert(id, tx);
        Ok(rx)
    }

    /// Freeze registration. After this call the validator set, power map,
    /// and registration order are immutable for the rest of the run.
    pub fn build(self) -> Result<Fabric, GossipError> {
        if self.order.is_empty() {
            return Err(GossipError::EmptyValidatorSet);
        }

        Ok(Fabric {
            inner: Arc::new(Inner {
                senders: self.senders,
                power: self.power,
                order: self.order,
                min_delay_ms: self.min_delay_ms,
                max_delay_ms: self.max_delay_ms,
            }),
        })
    }
}

struct Inner {
    senders: HashMap<ValidatorId, mpsc::UnboundedSender<Message>>,
    power: HashMap<ValidatorId, VotingPower>,
    order: Vec<ValidatorId>,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

/// A handle to the shared gossip fabric. Cheap to clone; every clone shares
/// the same underlying registry of inbound queues.
#[derive(Clone)]
pub struct Fabric {
    inner: Arc<Inner>,
}

impl Fabric {
    /// Registered validator identifiers, in registration order.
    pub fn validators(&self) -> &[ValidatorId] {
        &self.inner.order
    }

    /// The voting power map, read-only for the lifetime of the run.
    pub fn power_map(&self) -> &HashMap<ValidatorId, VotingPower> {
        &self.inner.power
    }

    /// Total voting power across all registered validators (`N`).
    pub fn total_power(&self) -> VotingPower {
        self.inner.power.values().sum()
    }

    /// Deliver `msg` to `to` after an independent stochastic delay drawn
    /// uniformly from `[10ms, 50ms]`. Spawns its own task so the caller never
    /// blocks on the delay; enqueue onto the unbounded MPSC channel is FIFO
    /// and task-safe by construction.
    ///
    /// Sending to an unregistered id is a programmer error and panics.
    pub fn send(&self, to: &ValidatorId, msg: Message) {
        let sender = self
            .inner
            .senders
            .get(to)
            .unwrap_or_else(|| panic!("gossip: send to unregistered validator `{to}`"))
            .clone();

        let delay_ms = rand::thread_rng().gen_range(self.inner.min_delay_ms..=self.inner.max_delay_ms);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // The receiver may have been dropped if the validator task has
            // already exited; that's a normal shutdown race, not a fault.
            let _ = sender.send(msg);
        });
    }

    /// Deliver `msg` to every registered validator, including `from`. Each
    /// recipient's delay is independent, so this calls [`Fabric::send`] once
    /// per recipient rather than imposing a single shared delay.
    pub fn broadcast(&self, from: &ValidatorId, msg: Message) {
        trace!(%from, kind = %msg.kind(), "broadcasting message to {} validators", self.inner.order.len());
        for to in &self.inner.order {
            self.send(to, msg.clone());
        }
    }
}
