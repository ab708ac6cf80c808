//! C-ABI surface shared with the foreign runtime.
//!
//! A foreign field registers itself by handing over a [`RawFieldTable`], a
//! block of function pointers laid out in a fixed order. Handles crossing the
//! boundary are opaque pointers owned by the foreign collector.

use std::ffi::{c_char, c_void};
use std::ptr::NonNull;

use num_bigint::{BigInt, Sign};
use smallvec::SmallVec;

/// Opaque handle to a value owned by the foreign runtime.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignHandle(NonNull<c_void>);

impl ForeignHandle {
    /// Returns `None` for a null pointer.
    #[inline]
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(ForeignHandle)
    }

    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Borrowed big integer in the host's digit layout: little-endian base 2^32
/// magnitude plus a sign (`-1`, `0`, `+1`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawBigInt {
    pub sign: i32,
    pub len: usize,
    pub digits: *const u32,
}

impl RawBigInt {
    /// Rebuilds the integer.
    ///
    /// # Safety
    /// `digits` must point to `len` readable `u32` values (or `len` must be 0).
    pub unsafe fn to_bigint(&self) -> BigInt {
        let digits: &[u32] = if self.len == 0 || self.digits.is_null() {
            &[]
        } else {
            // SAFETY: guaranteed by the caller.
            unsafe { std::slice::from_raw_parts(self.digits, self.len) }
        };
        let sign = match self.sign.signum() {
            1 => Sign::Plus,
            -1 => Sign::Minus,
            _ => Sign::NoSign,
        };
        BigInt::from_slice(sign, digits)
    }
}

/// Digit buffer backing a [`RawBigInt`] for the duration of a foreign call.
#[derive(Debug, Clone)]
pub struct OwnedDigits {
    sign: i32,
    digits: Vec<u32>,
}

impl OwnedDigits {
    pub fn new(n: &BigInt) -> Self {
        let (sign, digits) = n.to_u32_digits();
        let sign = match sign {
            Sign::Plus => 1,
            Sign::Minus => -1,
            Sign::NoSign => 0,
        };
        Self { sign, digits }
    }

    /// The returned view borrows `self` and must not outlive it.
    pub fn as_raw(&self) -> RawBigInt {
        RawBigInt {
            sign: self.sign,
            len: self.digits.len(),
            digits: self.digits.as_ptr(),
        }
    }
}

pub type InitFn = unsafe extern "C" fn(field: i64, value: i64) -> *mut c_void;
pub type InitRationalFn =
    unsafe extern "C" fn(field: i64, numerator: RawBigInt, denominator: RawBigInt) -> *mut c_void;
pub type UnaryFn = unsafe extern "C" fn(handle: *mut c_void) -> *mut c_void;
pub type HandleFn = unsafe extern "C" fn(handle: *mut c_void);
pub type BinaryFn = unsafe extern "C" fn(lhs: *mut c_void, rhs: *mut c_void) -> *mut c_void;
pub type PowFn = unsafe extern "C" fn(handle: *mut c_void, exponent: i64) -> *mut c_void;
pub type CmpFn = unsafe extern "C" fn(lhs: *mut c_void, rhs: *mut c_void) -> i64;
/// The returned string is NUL-terminated, owned by the foreign side and only
/// valid until the next call into the same field.
pub type ToStringFn = unsafe extern "C" fn(handle: *mut c_void) -> *const c_char;
pub type FromStringFn = unsafe extern "C" fn(text: *const c_char) -> *mut c_void;
pub type PredicateFn = unsafe extern "C" fn(handle: *mut c_void) -> bool;
pub type SignFn = unsafe extern "C" fn(handle: *mut c_void) -> i64;

/// Registration block, in slot order.
///
/// `from_string` and `is_inf` are part of the layout but never called, and
/// `abs` is optional; every other slot is required.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFieldTable {
    pub init: Option<InitFn>,
    pub init_from_rational: Option<InitRationalFn>,
    pub copy: Option<UnaryFn>,
    pub protect: Option<HandleFn>,
    pub release: Option<HandleFn>,
    pub add: Option<BinaryFn>,
    pub sub: Option<BinaryFn>,
    pub mul: Option<BinaryFn>,
    pub div: Option<BinaryFn>,
    pub pow: Option<PowFn>,
    pub negate: Option<UnaryFn>,
    pub cmp: Option<CmpFn>,
    pub to_string: Option<ToStringFn>,
    pub from_string: Option<FromStringFn>,
    pub is_zero: Option<PredicateFn>,
    pub is_one: Option<PredicateFn>,
    pub is_inf: Option<PredicateFn>,
    pub sign: Option<SignFn>,
    pub abs: Option<UnaryFn>,
}

impl RawFieldTable {
    /// Names of the required slots that are empty, in slot order.
    pub fn missing_entries(&self) -> SmallVec<[&'static str; 4]> {
        let slots = [
            ("init", self.init.is_some()),
            ("init_from_rational", self.init_from_rational.is_some()),
            ("copy", self.copy.is_some()),
            ("protect", self.protect.is_some()),
            ("release", self.release.is_some()),
            ("add", self.add.is_some()),
            ("sub", self.sub.is_some()),
            ("mul", self.mul.is_some()),
            ("div", self.div.is_some()),
            ("pow", self.pow.is_some()),
            ("negate", self.negate.is_some()),
            ("cmp", self.cmp.is_some()),
            ("to_string", self.to_string.is_some()),
            ("is_zero", self.is_zero.is_some()),
            ("is_one", self.is_one.is_some()),
            ("sign", self.sign.is_some()),
        ];
        slots
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect()
    }
}
