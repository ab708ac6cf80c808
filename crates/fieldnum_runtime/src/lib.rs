//! Host-side arithmetic over foreign algebraic fields.
//!
//! Elements start out as exact rationals and are promoted into a foreign
//! field the first time they meet an element of that field. Foreign values
//! stay protected from the foreign collector for as long as an element holds
//! them, and the field's operations are reached through a [`FieldRegistry`].
//!
//! Elements and the registry share descriptors through `Rc` and are bound to
//! the thread of the foreign runtime they talk to.

#![allow(clippy::should_implement_trait)]
#![allow(clippy::new_without_default)]

mod config;
mod descriptor;
mod element;
mod extended;
mod guard;
mod registry;
mod repr;

pub use config::RegistryConfig;
pub use descriptor::FieldDescriptor;
pub use element::FieldElement;
pub use extended::ExtendedNumber;
pub use registry::FieldRegistry;

pub use fieldnum_core::{
    BigInt, BigRational, Error, FieldId, ForeignHandle, Indeterminate, InfinityMarker,
    OwnedDigits, RawBigInt, RawFieldTable, Result, Scalar,
};
