//! Field identifiers and the infinity marker.

use std::fmt;

/// Identifier of a registered foreign field.
///
/// `FieldId::RATIONAL` (`0`) is reserved for exact rationals and is never
/// registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldId(pub i64);

impl FieldId {
    pub const RATIONAL: FieldId = FieldId(0);

    #[inline]
    pub fn is_rational(self) -> bool {
        self.0 == 0
    }

    /// Two identifiers may meet in one binary operation when they are equal or
    /// when either side is the rational identifier.
    #[inline]
    pub fn compatible(self, other: FieldId) -> bool {
        self == other || self.is_rational() || other.is_rational()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FieldId {
    fn from(id: i64) -> Self {
        FieldId(id)
    }
}

/// Ternary infinity marker of an extended number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InfinityMarker {
    #[default]
    Finite,
    Positive,
    Negative,
}

impl InfinityMarker {
    /// `+1` maps to `Positive`, `-1` to `Negative`, `0` to `Finite`; only the
    /// sign of `sign` matters.
    pub fn from_sign(sign: i64) -> Self {
        match sign.signum() {
            1 => InfinityMarker::Positive,
            -1 => InfinityMarker::Negative,
            _ => InfinityMarker::Finite,
        }
    }

    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            InfinityMarker::Finite => 0,
            InfinityMarker::Positive => 1,
            InfinityMarker::Negative => -1,
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self == InfinityMarker::Finite
    }

    pub fn negated(self) -> Self {
        Self::from_sign(-self.sign())
    }

    /// Marker of `self * x` where `x` has the given sign.
    pub fn times(self, sign: i64) -> Self {
        Self::from_sign(self.sign() * sign.signum())
    }
}
