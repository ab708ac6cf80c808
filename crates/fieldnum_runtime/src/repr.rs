//! Internal representation of a field element.
//!
//! An element is either an exact rational owned by the host or a protected
//! handle into a foreign field. Binary operations first reconcile their
//! operands: an exact rational meeting a foreign element is upgraded into that
//! element's field; two foreign elements must share a field.

use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Rc;

use fieldnum_core::{Error, FieldId, ForeignHandle, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Pow, Signed, Zero};

use crate::descriptor::FieldDescriptor;
use crate::guard::Protected;

pub(crate) enum Repr {
    Rational(BigRational),
    Foreign(Protected),
}

/// A foreign operand, either borrowed from its owner or freshly upgraded.
#[derive(Debug)]
pub(crate) enum Operand<'a> {
    Held(&'a Protected),
    Upgraded(Protected),
}

impl Deref for Operand<'_> {
    type Target = Protected;

    fn deref(&self) -> &Protected {
        match self {
            Operand::Held(p) => p,
            Operand::Upgraded(p) => p,
        }
    }
}

/// Operands brought to a common representation.
pub(crate) enum Reconciled<'a> {
    Rational(&'a BigRational, &'a BigRational),
    Foreign(Operand<'a>, Operand<'a>),
}

pub(crate) fn reconcile<'a>(a: &'a Repr, b: &'a Repr) -> Result<Reconciled<'a>> {
    match (a, b) {
        (Repr::Rational(x), Repr::Rational(y)) => Ok(Reconciled::Rational(x, y)),
        (Repr::Foreign(p), Repr::Rational(_)) => {
            Ok(Reconciled::Foreign(Operand::Held(p), a.upgrade_other(b)?))
        }
        (Repr::Rational(_), Repr::Foreign(q)) => {
            Ok(Reconciled::Foreign(b.upgrade_other(a)?, Operand::Held(q)))
        }
        (Repr::Foreign(p), Repr::Foreign(q)) => {
            if !p.field_id().compatible(q.field_id()) {
                return Err(Error::FieldMismatch {
                    left: p.field_id(),
                    right: q.field_id(),
                });
            }
            Ok(Reconciled::Foreign(Operand::Held(p), Operand::Held(q)))
        }
    }
}

fn rational_pow(base: &BigRational, exponent: i64) -> Result<BigRational> {
    if exponent < 0 && base.is_zero() {
        return Err(Error::ZeroDivide);
    }
    let e = exponent.unsigned_abs();
    let numer: BigInt = Pow::pow(base.numer(), e);
    let denom: BigInt = Pow::pow(base.denom(), e);
    let power = BigRational::new(numer, denom);
    Ok(if exponent < 0 { power.recip() } else { power })
}

fn signum(r: &BigRational) -> i64 {
    if r.is_positive() {
        1
    } else if r.is_negative() {
        -1
    } else {
        0
    }
}

impl Repr {
    #[inline]
    pub(crate) fn is_rational(&self) -> bool {
        matches!(self, Repr::Rational(_))
    }

    pub(crate) fn field_id(&self) -> FieldId {
        match self {
            Repr::Rational(_) => FieldId::RATIONAL,
            Repr::Foreign(p) => p.field_id(),
        }
    }

    pub(crate) fn descriptor(&self) -> Option<&Rc<FieldDescriptor>> {
        match self {
            Repr::Rational(_) => None,
            Repr::Foreign(p) => Some(p.descriptor()),
        }
    }

    pub(crate) fn foreign_handle(&self) -> Option<ForeignHandle> {
        match self {
            Repr::Rational(_) => None,
            Repr::Foreign(p) => Some(p.handle()),
        }
    }

    pub(crate) fn as_rational(&self) -> Result<&BigRational> {
        match self {
            Repr::Rational(r) => Ok(r),
            Repr::Foreign(p) => Err(Error::InvalidRationalAccess(p.field_id())),
        }
    }

    /// Bring `self` into the field of `desc`. A foreign element of another
    /// field cannot be moved.
    pub(crate) fn upgrade_to<'a>(&'a self, desc: &Rc<FieldDescriptor>) -> Result<Operand<'a>> {
        match self {
            Repr::Rational(r) => {
                tracing::trace!(field = %desc.id(), "upgrade rational");
                Ok(Operand::Upgraded(Protected::from_rational(desc, r)?))
            }
            Repr::Foreign(p) if p.field_id() == desc.id() => Ok(Operand::Held(p)),
            Repr::Foreign(p) => Err(Error::FieldMismatch {
                left: desc.id(),
                right: p.field_id(),
            }),
        }
    }

    /// Called on the stronger operand: bring `other` into `self`'s field.
    pub(crate) fn upgrade_other<'a>(&self, other: &'a Repr) -> Result<Operand<'a>> {
        match self {
            Repr::Foreign(p) => other.upgrade_to(p.descriptor()),
            Repr::Rational(_) => Err(Error::UpgradeFailure(other.field_id())),
        }
    }

    pub(crate) fn try_clone(&self) -> Result<Repr> {
        Ok(match self {
            Repr::Rational(r) => Repr::Rational(r.clone()),
            Repr::Foreign(p) => Repr::Foreign(p.try_clone()?),
        })
    }

    pub(crate) fn negate(&self) -> Result<Repr> {
        Ok(match self {
            Repr::Rational(r) => Repr::Rational(-r),
            Repr::Foreign(p) => Repr::Foreign(p.negate()?),
        })
    }

    pub(crate) fn add(&self, rhs: &Repr) -> Result<Repr> {
        Ok(match reconcile(self, rhs)? {
            Reconciled::Rational(a, b) => Repr::Rational(a + b),
            Reconciled::Foreign(a, b) => Repr::Foreign(a.add(&b)?),
        })
    }

    pub(crate) fn sub(&self, rhs: &Repr) -> Result<Repr> {
        Ok(match reconcile(self, rhs)? {
            Reconciled::Rational(a, b) => Repr::Rational(a - b),
            Reconciled::Foreign(a, b) => Repr::Foreign(a.sub(&b)?),
        })
    }

    pub(crate) fn mul(&self, rhs: &Repr) -> Result<Repr> {
        Ok(match reconcile(self, rhs)? {
            Reconciled::Rational(a, b) => Repr::Rational(a * b),
            Reconciled::Foreign(a, b) => Repr::Foreign(a.mul(&b)?),
        })
    }

    pub(crate) fn div(&self, rhs: &Repr) -> Result<Repr> {
        match reconcile(self, rhs)? {
            Reconciled::Rational(_, b) if b.is_zero() => Err(Error::ZeroDivide),
            Reconciled::Rational(a, b) => Ok(Repr::Rational(a / b)),
            Reconciled::Foreign(_, b) if b.is_zero() => Err(Error::ZeroDivide),
            Reconciled::Foreign(a, b) => Ok(Repr::Foreign(a.div(&b)?)),
        }
    }

    pub(crate) fn pow(&self, exponent: i64) -> Result<Repr> {
        match self {
            Repr::Rational(r) => rational_pow(r, exponent).map(Repr::Rational),
            Repr::Foreign(p) if exponent < 0 && p.is_zero() => Err(Error::ZeroDivide),
            Repr::Foreign(p) => Ok(Repr::Foreign(p.pow(exponent)?)),
        }
    }

    pub(crate) fn abs(&self) -> Result<Repr> {
        Ok(match self {
            Repr::Rational(r) => Repr::Rational(r.abs()),
            Repr::Foreign(p) => Repr::Foreign(p.abs()?),
        })
    }

    pub(crate) fn compare(&self, rhs: &Repr) -> Result<Ordering> {
        Ok(match reconcile(self, rhs)? {
            Reconciled::Rational(a, b) => a.cmp(b),
            Reconciled::Foreign(a, b) => a.cmp(&b),
        })
    }

    pub(crate) fn is_zero(&self) -> bool {
        match self {
            Repr::Rational(r) => r.is_zero(),
            Repr::Foreign(p) => p.is_zero(),
        }
    }

    pub(crate) fn is_one(&self) -> bool {
        match self {
            Repr::Rational(r) => r.is_one(),
            Repr::Foreign(p) => p.is_one(),
        }
    }

    pub(crate) fn sign(&self) -> i64 {
        match self {
            Repr::Rational(r) => signum(r),
            Repr::Foreign(p) => p.sign(),
        }
    }

    pub(crate) fn stringify(&self) -> String {
        match self {
            Repr::Rational(r) => r.to_string(),
            Repr::Foreign(p) => format!("({})", p.stringify()),
        }
    }
}
