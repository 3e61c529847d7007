/// Either `Nil` or a value of type `T`.
///
/// Isomorphic to `Option<T>` but more explicit about intent at call sites
/// that talk about consensus votes, where "nil" is a first-class vote choice
/// rather than an absence of data.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NilOrVal<T> {
    #[default]
    Nil,
    Val(T),
}

impl<T> NilOrVal<T> {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn is_val(&self) -> bool {
        matches!(self, Self::Val(_))
    }

    pub fn as_ref(&self) -> NilOrVal<&T> {
        match self {
            NilOrVal::Nil => NilOrVal::Nil,
            NilOrVal::Val(v) => NilOrVal::Val(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> NilOrVal<U> {
        match self {
            NilOrVal::Nil => NilOrVal::Nil,
            NilOrVal::Val(v) => NilOrVal::Val(f(v)),
        }
    }

    pub fn into_val(self) -> Option<T> {
        match self {
            NilOrVal::Nil => None,
            NilOrVal::Val(v) => Some(v),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for NilOrVal<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NilOrVal::Nil => write!(f, "nil"),
            NilOrVal::Val(v) => write!(f, "{v:?}"),
        }
    }
}
