//! An in-process, delay-injecting gossip fabric standing in for a real
//! network transport: a registry of per-validator inbound queues plus a
//! broadcast primitive that perturbs delivery order with independent
//! per-recipient jitter, simulating a partially-synchronous network.

#![forbid(unsafe_code)]

mod error;
mod fabric;

pub use error::GossipError;
pub use fabric::{Fabric, FabricBuilder, Inbox};
