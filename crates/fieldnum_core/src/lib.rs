//! Core types for the fieldnum bridge.
//!
//! This crate contains the types that are independent of the runtime:
//! - `FieldId` - Identifier of a registered foreign field (`0` is the exact rationals)
//! - `InfinityMarker` - Ternary finite/+inf/-inf marker of the extended numbers
//! - `ForeignHandle` - Opaque handle owned by the foreign runtime
//! - `RawFieldTable` - C-ABI block of function pointers supplied at registration
//! - `Error` - Errors raised by registration and arithmetic
//! - `Scalar` - Zero/one capability queries used by generic host code

pub mod abi;
pub mod error;
pub mod field;
pub mod scalar;

pub use abi::{ForeignHandle, OwnedDigits, RawBigInt, RawFieldTable};
pub use error::{Error, Indeterminate, Result};
pub use field::{FieldId, InfinityMarker};
pub use scalar::Scalar;

pub use num_bigint::BigInt;
pub use num_rational::BigRational;
