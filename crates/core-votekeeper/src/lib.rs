//! Weighted vote tallying and quorum arithmetic, kept separate from the
//! validator state machine in [`tendersim_consensus`] the same way the
//! teacher engine keeps vote-keeping out of its driver crate.

#![forbid(unsafe_code)]

mod keeper;
mod threshold;

pub use keeper::VoteKeeper;
pub use threshold::{Quorum, Threshold};
