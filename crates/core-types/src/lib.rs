//! Core types shared by the gossip fabric and the validator state machine.
//!
//! Values are opaque byte blobs; the only thing the protocol knows about a
//! value is its [`ValueId`], the hash of its bytes. There is deliberately no
//! generic `Context`/application trait here, unlike a production BFT engine:
//! this simulator agrees on raw bytes, nothing more.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![warn(rustdoc::broken_intra_doc_links)]

mod height;
mod message;
mod nil_or_val;
mod round;
mod step;
mod validator;
mod value;

pub use height::Height;
pub use message::Message;
pub use nil_or_val::NilOrVal;
pub use round::Round;
pub use step::Step;
pub use validator::{ValidatorId, VotingPower};
pub use value::{vid, Value, ValueId};
