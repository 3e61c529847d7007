use core::fmt;

/// A consensus height: the sequence number of the decision being reached.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Height(u64);

impl Height {
    /// The initial height of a run.
    pub const INITIAL: Height = Height(0);

    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The height that follows this one.
    pub fn increment(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for Height {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Height({})", self.0)
    }
}
