//! Error types for registration and arithmetic.

use std::fmt;

use smallvec::SmallVec;

use crate::field::FieldId;

/// Result type alias for fieldnum operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Undefined results of extended-real arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indeterminate {
    InfMinusInf,
    ZeroTimesInf,
    InfOverInf,
    InfPowZero,
}

impl fmt::Display for Indeterminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Indeterminate::InfMinusInf => "inf - inf",
            Indeterminate::ZeroTimesInf => "0 * inf",
            Indeterminate::InfOverInf => "inf / inf",
            Indeterminate::InfPowZero => "inf ^ 0",
        })
    }
}

/// Errors raised by the registry, the descriptors and the number facades.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Registration
    // =========================================================================
    /// The identifier already has a descriptor.
    #[error("cannot re-register field {0}")]
    DuplicateRegistration(FieldId),

    /// Identifier `0` belongs to the exact rationals.
    #[error("field identifier 0 is reserved for exact rationals")]
    ReservedField,

    /// Required slots of the registration block are empty.
    #[error("function table for field {field} is missing: {}", .missing.join(", "))]
    IncompleteTable {
        field: FieldId,
        missing: SmallVec<[&'static str; 4]>,
    },

    /// Registration attempted after the registry served its first lookup.
    #[error("registry is sealed, cannot register field {0}")]
    RegistrySealed(FieldId),

    /// Lookup of an identifier that was never registered.
    #[error("field {0} is not registered")]
    UnknownField(FieldId),

    // =========================================================================
    // Arithmetic
    // =========================================================================
    /// Binary operation across two different proper fields.
    #[error("different fields: {left} and {right}")]
    FieldMismatch { left: FieldId, right: FieldId },

    /// Rational view requested from a proper field element.
    #[error("error accessing rational of proper field element (field {0})")]
    InvalidRationalAccess(FieldId),

    /// Rational view requested from an infinite value.
    #[error("infinite value has no rational representation")]
    NotFinite,

    #[error("division by zero")]
    ZeroDivide,

    #[error("indeterminate form: {0}")]
    IndeterminateForm(Indeterminate),

    /// An exact rational was asked to upgrade another operand.
    #[error("cannot upgrade into the representation of field {0}")]
    UpgradeFailure(FieldId),

    // =========================================================================
    // Foreign boundary
    // =========================================================================
    /// A handle-producing slot returned null.
    #[error("field {field} returned a null handle from `{op}`")]
    NullHandle { field: FieldId, op: &'static str },
}
