use core::fmt;

use bytes::Bytes;
use sha3::{Digest, Sha3_256};

/// An opaque, non-empty byte blob being agreed upon. The protocol never
/// interprets its contents; only its [`ValueId`] (the hash of its bytes)
/// carries meaning on the wire.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value(Bytes);

impl Value {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        debug_assert!(!bytes.is_empty(), "a Value must not be empty");
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", vid(self).short())
    }
}

/// The SHA3-256 digest of a [`Value`]'s bytes: its content-addressed identity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueId([u8; 32]);

impl ValueId {
    pub const fn new(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The first six hex characters of the id, used in human-facing logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..3])
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({})", self.short())
    }
}

/// Hash a value down to its [`ValueId`]. Deterministic and collision-resistant
/// under the standard SHA3-256 assumptions; `vid(nil) = nil` is expressed at
/// the call site via `NilOrVal::map(vid)` rather than here, since `Value`
/// itself is never nil.
pub fn vid(value: &Value) -> ValueId {
    let mut hasher = Sha3_256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    ValueId::new(digest.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vid_is_deterministic() {
        let v = Value::new(Bytes::from_static(b"hello"));
        assert_eq!(vid(&v), vid(&v));
    }

    #[test]
    fn vid_distinguishes_distinct_values() {
        let a = Value::new(Bytes::from_static(b"alpha"));
        let b = Value::new(Bytes::from_static(b"beta"));
        assert_ne!(vid(&a), vid(&b));
    }

    #[test]
    fn short_is_six_hex_chars() {
        let v = Value::new(Bytes::from_static(b"hello"));
        assert_eq!(vid(&v).short().len(), 6);
    }
}
