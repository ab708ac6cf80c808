//! Field elements: exact rationals that promote into a foreign field on demand.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use fieldnum_core::{Error, FieldId, ForeignHandle, Result, Scalar};
use num_rational::BigRational;
use num_traits::ToPrimitive;

use crate::descriptor::FieldDescriptor;
use crate::guard::Protected;
use crate::registry::FieldRegistry;
use crate::repr::Repr;

/// Element of an algebraic field that embeds the rationals.
///
/// Every operation builds a new representation and only then replaces the
/// old one, so a failed operation leaves the receiver untouched.
pub struct FieldElement {
    repr: Repr,
}

impl FieldElement {
    pub fn from_int(value: i64) -> Self {
        Self::from_rational(BigRational::from_integer(value.into()))
    }

    pub fn from_rational(value: BigRational) -> Self {
        Self {
            repr: Repr::Rational(value),
        }
    }

    /// Wrap a protected copy of `handle`; the caller keeps ownership of its
    /// own handle.
    pub fn from_foreign(
        registry: &FieldRegistry,
        handle: ForeignHandle,
        field: FieldId,
    ) -> Result<Self> {
        let desc = registry.lookup(field)?;
        Ok(Self {
            repr: Repr::Foreign(Protected::copy_of(&desc, handle)?),
        })
    }

    /// Zero of the given field, or the rational zero for `None`.
    pub(crate) fn zero_in(desc: Option<&Rc<FieldDescriptor>>) -> Result<Self> {
        Ok(match desc {
            Some(desc) => Self {
                repr: Repr::Foreign(Protected::from_int(desc, 0)?),
            },
            None => Self::from_int(0),
        })
    }

    pub(crate) fn descriptor(&self) -> Option<&Rc<FieldDescriptor>> {
        self.repr.descriptor()
    }

    /// Descriptor of the field both operands live in after reconciliation.
    pub(crate) fn common_field(&self, rhs: &Self) -> Result<Option<Rc<FieldDescriptor>>> {
        match (self.descriptor(), rhs.descriptor()) {
            (Some(a), Some(b)) if !a.id().compatible(b.id()) => Err(Error::FieldMismatch {
                left: a.id(),
                right: b.id(),
            }),
            (Some(a), _) => Ok(Some(a.clone())),
            (None, b) => Ok(b.cloned()),
        }
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            repr: self.repr.try_clone()?,
        })
    }

    /// Replace `self` with a copy of `other`.
    pub fn assign(&mut self, other: &Self) -> Result<()> {
        self.repr = other.repr.try_clone()?;
        Ok(())
    }

    pub fn assign_rational(&mut self, value: BigRational) {
        self.repr = Repr::Rational(value);
    }

    pub fn add(&self, rhs: &Self) -> Result<Self> {
        self.repr.add(&rhs.repr).map(Self::wrap)
    }

    pub fn sub(&self, rhs: &Self) -> Result<Self> {
        self.repr.sub(&rhs.repr).map(Self::wrap)
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self> {
        self.repr.mul(&rhs.repr).map(Self::wrap)
    }

    pub fn div(&self, rhs: &Self) -> Result<Self> {
        self.repr.div(&rhs.repr).map(Self::wrap)
    }

    pub fn add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.repr = self.repr.add(&rhs.repr)?;
        Ok(())
    }

    pub fn sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.repr = self.repr.sub(&rhs.repr)?;
        Ok(())
    }

    pub fn mul_assign(&mut self, rhs: &Self) -> Result<()> {
        self.repr = self.repr.mul(&rhs.repr)?;
        Ok(())
    }

    pub fn div_assign(&mut self, rhs: &Self) -> Result<()> {
        self.repr = self.repr.div(&rhs.repr)?;
        Ok(())
    }

    /// Mixed forms taking a host rational on the right.
    pub fn add_rational(&self, rhs: &BigRational) -> Result<Self> {
        self.add(&Self::from_rational(rhs.clone()))
    }

    pub fn sub_rational(&self, rhs: &BigRational) -> Result<Self> {
        self.sub(&Self::from_rational(rhs.clone()))
    }

    pub fn mul_rational(&self, rhs: &BigRational) -> Result<Self> {
        self.mul(&Self::from_rational(rhs.clone()))
    }

    pub fn div_rational(&self, rhs: &BigRational) -> Result<Self> {
        self.div(&Self::from_rational(rhs.clone()))
    }

    pub fn add_assign_rational(&mut self, rhs: &BigRational) -> Result<()> {
        *self = self.add_rational(rhs)?;
        Ok(())
    }

    pub fn sub_assign_rational(&mut self, rhs: &BigRational) -> Result<()> {
        *self = self.sub_rational(rhs)?;
        Ok(())
    }

    pub fn mul_assign_rational(&mut self, rhs: &BigRational) -> Result<()> {
        *self = self.mul_rational(rhs)?;
        Ok(())
    }

    pub fn div_assign_rational(&mut self, rhs: &BigRational) -> Result<()> {
        *self = self.div_rational(rhs)?;
        Ok(())
    }

    pub fn neg(&self) -> Result<Self> {
        self.repr.negate().map(Self::wrap)
    }

    /// Negate in place.
    pub fn negate(&mut self) -> Result<()> {
        self.repr = self.repr.negate()?;
        Ok(())
    }

    pub fn pow(&self, exponent: i64) -> Result<Self> {
        self.repr.pow(exponent).map(Self::wrap)
    }

    pub fn abs(&self) -> Result<Self> {
        self.repr.abs().map(Self::wrap)
    }

    /// `|self| == |other|`.
    pub fn abs_eq(&self, other: &Self) -> Result<bool> {
        Ok(self.abs()?.compare(&other.abs()?)? == Ordering::Equal)
    }

    pub fn compare(&self, rhs: &Self) -> Result<Ordering> {
        self.repr.compare(&rhs.repr)
    }

    pub fn compare_rational(&self, rhs: &BigRational) -> Result<Ordering> {
        match &self.repr {
            Repr::Rational(r) => Ok(r.cmp(rhs)),
            Repr::Foreign(_) => self.compare(&Self::from_rational(rhs.clone())),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.repr.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.repr.is_one()
    }

    /// `-1`, `0` or `1`.
    pub fn sign(&self) -> i64 {
        self.repr.sign()
    }

    /// Field elements are always finite.
    pub fn is_finite(&self) -> bool {
        true
    }

    pub fn is_inf(&self) -> i64 {
        0
    }

    pub fn is_rational(&self) -> bool {
        self.repr.is_rational()
    }

    pub fn uses_rational(&self) -> bool {
        self.repr.is_rational()
    }

    pub fn field_id(&self) -> FieldId {
        self.repr.field_id()
    }

    /// Live handle of a foreign element, for passing back to its runtime.
    /// Valid while `self` is alive and unchanged.
    pub fn foreign_handle(&self) -> Option<ForeignHandle> {
        self.repr.foreign_handle()
    }

    pub fn as_rational(&self) -> Result<&BigRational> {
        self.repr.as_rational()
    }

    pub fn to_rational(&self) -> Result<BigRational> {
        self.repr.as_rational().cloned()
    }

    pub fn to_f64(&self) -> Result<f64> {
        Ok(self.repr.as_rational()?.to_f64().unwrap_or(f64::NAN))
    }

    fn wrap(repr: Repr) -> Self {
        Self { repr }
    }
}

impl Scalar for FieldElement {
    fn zero() -> Self {
        Self::from_int(0)
    }

    fn one() -> Self {
        Self::from_int(1)
    }

    fn is_zero(&self) -> bool {
        self.repr.is_zero()
    }

    fn is_one(&self) -> bool {
        self.repr.is_one()
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::from_int(0)
    }
}

impl From<i64> for FieldElement {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<BigRational> for FieldElement {
    fn from(value: BigRational) -> Self {
        Self::from_rational(value)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl PartialOrd for FieldElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl PartialEq<BigRational> for FieldElement {
    fn eq(&self, other: &BigRational) -> bool {
        matches!(self.compare_rational(other), Ok(Ordering::Equal))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr.stringify())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Rational(r) => f.debug_tuple("Rational").field(r).finish(),
            Repr::Foreign(p) => f
                .debug_struct("Foreign")
                .field("field", &p.field_id())
                .field("value", &self.repr.stringify())
                .finish(),
        }
    }
}
