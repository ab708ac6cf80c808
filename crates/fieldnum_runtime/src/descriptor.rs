//! Typed operation tables.
//!
//! A [`FieldDescriptor`] is built once from a validated [`RawFieldTable`] and
//! wraps every slot in a safe method. The methods hand back raw pointers;
//! turning a fresh pointer into a protected handle is the job of
//! [`crate::guard::Protected`].

use std::cmp::Ordering;
use std::ffi::{CStr, c_void};
use std::fmt;

use fieldnum_core::abi::{
    BinaryFn, CmpFn, HandleFn, InitFn, InitRationalFn, PowFn, PredicateFn, SignFn, ToStringFn,
    UnaryFn,
};
use fieldnum_core::{Error, FieldId, ForeignHandle, OwnedDigits, RawFieldTable, Result};
use num_rational::BigRational;

/// Required slots, all present.
#[derive(Clone, Copy)]
pub(crate) struct FieldOps {
    init: InitFn,
    init_from_rational: InitRationalFn,
    copy: UnaryFn,
    protect: HandleFn,
    release: HandleFn,
    add: BinaryFn,
    sub: BinaryFn,
    mul: BinaryFn,
    div: BinaryFn,
    pow: PowFn,
    negate: UnaryFn,
    cmp: CmpFn,
    to_string: ToStringFn,
    is_zero: PredicateFn,
    is_one: PredicateFn,
    sign: SignFn,
    abs: Option<UnaryFn>,
}

impl FieldOps {
    pub(crate) fn from_raw(field: FieldId, table: &RawFieldTable) -> Result<Self> {
        let missing = table.missing_entries();
        let incomplete = || Error::IncompleteTable {
            field,
            missing: missing.clone(),
        };
        Ok(Self {
            init: table.init.ok_or_else(incomplete)?,
            init_from_rational: table.init_from_rational.ok_or_else(incomplete)?,
            copy: table.copy.ok_or_else(incomplete)?,
            protect: table.protect.ok_or_else(incomplete)?,
            release: table.release.ok_or_else(incomplete)?,
            add: table.add.ok_or_else(incomplete)?,
            sub: table.sub.ok_or_else(incomplete)?,
            mul: table.mul.ok_or_else(incomplete)?,
            div: table.div.ok_or_else(incomplete)?,
            pow: table.pow.ok_or_else(incomplete)?,
            negate: table.negate.ok_or_else(incomplete)?,
            cmp: table.cmp.ok_or_else(incomplete)?,
            to_string: table.to_string.ok_or_else(incomplete)?,
            is_zero: table.is_zero.ok_or_else(incomplete)?,
            is_one: table.is_one.ok_or_else(incomplete)?,
            sign: table.sign.ok_or_else(incomplete)?,
            abs: table.abs,
        })
    }
}

/// Operation table of one registered field.
///
/// Descriptors are immutable and live as long as any element of the field.
pub struct FieldDescriptor {
    id: FieldId,
    ops: FieldOps,
}

// SAFETY (all slot calls below): registration is `unsafe` and its caller
// guarantees that every slot accepts live handles of this field. Handles passed
// in are held by a `Protected` guard for the duration of the call.
impl FieldDescriptor {
    pub(crate) fn new(id: FieldId, ops: FieldOps) -> Self {
        Self { id, ops }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Whether the field supplied its own `abs` slot.
    pub fn has_native_abs(&self) -> bool {
        self.ops.abs.is_some()
    }

    pub(crate) fn init(&self, value: i64) -> *mut c_void {
        unsafe { (self.ops.init)(self.id.0, value) }
    }

    pub(crate) fn init_rational(&self, value: &BigRational) -> *mut c_void {
        let numer = OwnedDigits::new(value.numer());
        let denom = OwnedDigits::new(value.denom());
        unsafe { (self.ops.init_from_rational)(self.id.0, numer.as_raw(), denom.as_raw()) }
    }

    pub(crate) fn copy(&self, h: ForeignHandle) -> *mut c_void {
        unsafe { (self.ops.copy)(h.as_ptr()) }
    }

    pub(crate) fn protect(&self, h: ForeignHandle) {
        unsafe { (self.ops.protect)(h.as_ptr()) }
    }

    pub(crate) fn release(&self, h: ForeignHandle) {
        unsafe { (self.ops.release)(h.as_ptr()) }
    }

    pub(crate) fn add(&self, a: ForeignHandle, b: ForeignHandle) -> *mut c_void {
        unsafe { (self.ops.add)(a.as_ptr(), b.as_ptr()) }
    }

    pub(crate) fn sub(&self, a: ForeignHandle, b: ForeignHandle) -> *mut c_void {
        unsafe { (self.ops.sub)(a.as_ptr(), b.as_ptr()) }
    }

    pub(crate) fn mul(&self, a: ForeignHandle, b: ForeignHandle) -> *mut c_void {
        unsafe { (self.ops.mul)(a.as_ptr(), b.as_ptr()) }
    }

    pub(crate) fn div(&self, a: ForeignHandle, b: ForeignHandle) -> *mut c_void {
        unsafe { (self.ops.div)(a.as_ptr(), b.as_ptr()) }
    }

    pub(crate) fn pow(&self, h: ForeignHandle, exponent: i64) -> *mut c_void {
        unsafe { (self.ops.pow)(h.as_ptr(), exponent) }
    }

    pub(crate) fn negate(&self, h: ForeignHandle) -> *mut c_void {
        unsafe { (self.ops.negate)(h.as_ptr()) }
    }

    /// `None` when the field has no `abs` slot.
    pub(crate) fn abs(&self, h: ForeignHandle) -> Option<*mut c_void> {
        self.ops.abs.map(|abs| unsafe { abs(h.as_ptr()) })
    }

    pub(crate) fn cmp(&self, a: ForeignHandle, b: ForeignHandle) -> Ordering {
        unsafe { (self.ops.cmp)(a.as_ptr(), b.as_ptr()) }.cmp(&0)
    }

    pub(crate) fn is_zero(&self, h: ForeignHandle) -> bool {
        unsafe { (self.ops.is_zero)(h.as_ptr()) }
    }

    pub(crate) fn is_one(&self, h: ForeignHandle) -> bool {
        unsafe { (self.ops.is_one)(h.as_ptr()) }
    }

    pub(crate) fn sign(&self, h: ForeignHandle) -> i64 {
        unsafe { (self.ops.sign)(h.as_ptr()) }.signum()
    }

    /// Copies the foreign text out before any further call into the field.
    pub(crate) fn stringify(&self, h: ForeignHandle) -> String {
        let ptr = unsafe { (self.ops.to_string)(h.as_ptr()) };
        if ptr.is_null() {
            tracing::warn!(field = %self.id, "to_string returned null");
            return String::new();
        }
        // SAFETY: non-null and NUL-terminated per the slot contract.
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("native_abs", &self.has_native_abs())
            .finish()
    }
}
