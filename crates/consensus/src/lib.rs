//! The per-validator consensus state machine: round driving, proposal
//! emission, weighted vote tallying into quorums, locking/valid-value
//! tracking, decision, and height advancement — driven against the gossip
//! fabric by an async receive loop, one independent task per validator.

#![forbid(unsafe_code)]

mod error;
mod proposer;
mod state;
mod timeout;
mod validator;

pub use error::InternalInvariantViolation;
pub use proposer::proposer;
pub use state::{Action, ValidatorState};
pub use timeout::{TimeoutConfig, TimeoutEvent};
pub use validator::Validator;
