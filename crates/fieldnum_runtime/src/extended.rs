//! Extended numbers: field elements plus signed infinities.
//!
//! The foreign fields know nothing about infinity. An [`ExtendedNumber`]
//! carries the marker itself and keeps, next to it, a carrier element that
//! records which field the value belongs to. While the marker is infinite the
//! carrier is a zero of that field and its value is ignored.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use fieldnum_core::{
    Error, FieldId, ForeignHandle, Indeterminate, InfinityMarker, Result, Scalar,
};
use num_rational::BigRational;

use crate::descriptor::FieldDescriptor;
use crate::element::FieldElement;
use crate::registry::FieldRegistry;

pub struct ExtendedNumber {
    inf: InfinityMarker,
    value: FieldElement,
}

fn indeterminate(form: Indeterminate) -> Error {
    Error::IndeterminateForm(form)
}

impl ExtendedNumber {
    pub fn from_int(value: i64) -> Self {
        Self::finite(FieldElement::from_int(value))
    }

    pub fn from_rational(value: BigRational) -> Self {
        Self::finite(FieldElement::from_rational(value))
    }

    pub fn from_foreign(
        registry: &FieldRegistry,
        handle: ForeignHandle,
        field: FieldId,
    ) -> Result<Self> {
        FieldElement::from_foreign(registry, handle, field).map(Self::finite)
    }

    /// `+inf` for a positive `sign`, `-inf` for a negative one, zero for `0`.
    pub fn infinity(sign: i64) -> Self {
        Self {
            inf: InfinityMarker::from_sign(sign),
            value: FieldElement::from_int(0),
        }
    }

    pub fn max_value() -> Self {
        Self::infinity(1)
    }

    pub fn min_value() -> Self {
        Self::infinity(-1)
    }

    fn finite(value: FieldElement) -> Self {
        Self {
            inf: InfinityMarker::Finite,
            value,
        }
    }

    /// Infinite value whose carrier is a zero of `field`.
    fn infinite_in(field: Option<&Rc<FieldDescriptor>>, inf: InfinityMarker) -> Result<Self> {
        Ok(Self {
            inf,
            value: FieldElement::zero_in(field)?,
        })
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            inf: self.inf,
            value: self.value.try_clone()?,
        })
    }

    pub fn assign(&mut self, other: &Self) -> Result<()> {
        *self = other.try_clone()?;
        Ok(())
    }

    pub fn assign_rational(&mut self, value: BigRational) {
        *self = Self::from_rational(value);
    }

    pub fn add(&self, rhs: &Self) -> Result<Self> {
        let field = self.value.common_field(&rhs.value)?;
        match (self.inf, rhs.inf) {
            (InfinityMarker::Finite, InfinityMarker::Finite) => {
                self.value.add(&rhs.value).map(Self::finite)
            }
            (InfinityMarker::Finite, inf) => Self::infinite_in(field.as_ref(), inf),
            (a, b) if a.sign() + b.sign() == 0 => Err(indeterminate(Indeterminate::InfMinusInf)),
            (inf, _) => Self::infinite_in(field.as_ref(), inf),
        }
    }

    /// `a - inf` is `-inf` for every finite `a`.
    pub fn sub(&self, rhs: &Self) -> Result<Self> {
        let field = self.value.common_field(&rhs.value)?;
        match (self.inf, rhs.inf) {
            (InfinityMarker::Finite, InfinityMarker::Finite) => {
                self.value.sub(&rhs.value).map(Self::finite)
            }
            (InfinityMarker::Finite, inf) => Self::infinite_in(field.as_ref(), inf.negated()),
            (a, b) if a.sign() - b.sign() == 0 => Err(indeterminate(Indeterminate::InfMinusInf)),
            (inf, _) => Self::infinite_in(field.as_ref(), inf),
        }
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self> {
        let field = self.value.common_field(&rhs.value)?;
        match (self.inf, rhs.inf) {
            (InfinityMarker::Finite, InfinityMarker::Finite) => {
                self.value.mul(&rhs.value).map(Self::finite)
            }
            (InfinityMarker::Finite, _) if self.value.is_zero() => {
                Err(indeterminate(Indeterminate::ZeroTimesInf))
            }
            (_, InfinityMarker::Finite) if rhs.value.is_zero() => {
                Err(indeterminate(Indeterminate::ZeroTimesInf))
            }
            _ => Self::infinite_in(
                field.as_ref(),
                InfinityMarker::from_sign(self.sign() * rhs.sign()),
            ),
        }
    }

    pub fn div(&self, rhs: &Self) -> Result<Self> {
        let field = self.value.common_field(&rhs.value)?;
        if rhs.is_zero() {
            return Err(Error::ZeroDivide);
        }
        match (self.inf, rhs.inf) {
            (InfinityMarker::Finite, InfinityMarker::Finite) => {
                self.value.div(&rhs.value).map(Self::finite)
            }
            (InfinityMarker::Finite, _) => FieldElement::zero_in(field.as_ref()).map(Self::finite),
            (_, InfinityMarker::Finite) => {
                Self::infinite_in(field.as_ref(), self.inf.times(rhs.sign()))
            }
            _ => Err(indeterminate(Indeterminate::InfOverInf)),
        }
    }

    pub fn add_assign(&mut self, rhs: &Self) -> Result<()> {
        *self = self.add(rhs)?;
        Ok(())
    }

    pub fn sub_assign(&mut self, rhs: &Self) -> Result<()> {
        *self = self.sub(rhs)?;
        Ok(())
    }

    pub fn mul_assign(&mut self, rhs: &Self) -> Result<()> {
        *self = self.mul(rhs)?;
        Ok(())
    }

    pub fn div_assign(&mut self, rhs: &Self) -> Result<()> {
        *self = self.div(rhs)?;
        Ok(())
    }

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

    pub fn neg(&self) -> Result<Self> {
        if self.inf.is_finite() {
            return self.value.neg().map(Self::finite);
        }
        Ok(Self {
            inf: self.inf.negated(),
            value: self.value.try_clone()?,
        })
    }

    /// Negate in place.
    pub fn negate(&mut self) -> Result<()> {
        *self = self.neg()?;
        Ok(())
    }

    pub fn pow(&self, exponent: i64) -> Result<Self> {
        if self.inf.is_finite() {
            return self.value.pow(exponent).map(Self::finite);
        }
        let field = self.value.descriptor();
        match exponent.cmp(&0) {
            Ordering::Greater if exponent % 2 == 0 => {
                Self::infinite_in(field, InfinityMarker::Positive)
            }
            Ordering::Greater => Self::infinite_in(field, self.inf),
            Ordering::Equal => Err(indeterminate(Indeterminate::InfPowZero)),
            Ordering::Less => FieldElement::zero_in(field).map(Self::finite),
        }
    }

    pub fn abs(&self) -> Result<Self> {
        if self.inf.is_finite() {
            return self.value.abs().map(Self::finite);
        }
        Ok(Self {
            inf: InfinityMarker::Positive,
            value: self.value.try_clone()?,
        })
    }

    /// `|self| == |other|`.
    pub fn abs_eq(&self, other: &Self) -> Result<bool> {
        Ok(self.abs()?.compare(&other.abs()?)? == Ordering::Equal)
    }

    /// Infinities compare by marker only.
    pub fn compare(&self, rhs: &Self) -> Result<Ordering> {
        self.value.common_field(&rhs.value)?;
        if self.inf.is_finite() && rhs.inf.is_finite() {
            return self.value.compare(&rhs.value);
        }
        Ok((self.inf.sign() - rhs.inf.sign()).cmp(&0))
    }

    pub fn compare_rational(&self, rhs: &BigRational) -> Result<Ordering> {
        if self.inf.is_finite() {
            return self.value.compare_rational(rhs);
        }
        Ok(self.inf.sign().cmp(&0))
    }

    pub fn is_zero(&self) -> bool {
        self.inf.is_finite() && self.value.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.inf.is_finite() && self.value.is_one()
    }

    /// `-1`, `0` or `1`; the marker's sign for infinities.
    pub fn sign(&self) -> i64 {
        if self.inf.is_finite() {
            self.value.sign()
        } else {
            self.inf.sign()
        }
    }

    /// `0` when finite, otherwise the sign of the infinity.
    pub fn is_inf(&self) -> i64 {
        self.inf.sign()
    }

    pub fn is_finite(&self) -> bool {
        self.inf.is_finite()
    }

    pub fn infinity_marker(&self) -> InfinityMarker {
        self.inf
    }

    pub fn uses_rational(&self) -> bool {
        self.value.uses_rational()
    }

    pub fn field_id(&self) -> FieldId {
        self.value.field_id()
    }

    /// Live handle of a finite foreign value.
    pub fn foreign_handle(&self) -> Option<ForeignHandle> {
        if self.inf.is_finite() {
            self.value.foreign_handle()
        } else {
            None
        }
    }

    pub fn as_rational(&self) -> Result<&BigRational> {
        if !self.inf.is_finite() {
            return Err(Error::NotFinite);
        }
        self.value.as_rational()
    }

    pub fn to_rational(&self) -> Result<BigRational> {
        self.as_rational().cloned()
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self.inf {
            InfinityMarker::Finite => self.value.to_f64(),
            InfinityMarker::Positive => Ok(f64::INFINITY),
            InfinityMarker::Negative => Ok(f64::NEG_INFINITY),
        }
    }

    pub fn into_element(self) -> Result<FieldElement> {
        if !self.inf.is_finite() {
            return Err(Error::NotFinite);
        }
        Ok(self.value)
    }
}

impl Scalar for ExtendedNumber {
    fn zero() -> Self {
        Self::from_int(0)
    }

    fn one() -> Self {
        Self::from_int(1)
    }

    fn is_zero(&self) -> bool {
        ExtendedNumber::is_zero(self)
    }

    fn is_one(&self) -> bool {
        ExtendedNumber::is_one(self)
    }
}

impl Default for ExtendedNumber {
    fn default() -> Self {
        Self::from_int(0)
    }
}

impl From<i64> for ExtendedNumber {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<BigRational> for ExtendedNumber {
    fn from(value: BigRational) -> Self {
        Self::from_rational(value)
    }
}

impl From<FieldElement> for ExtendedNumber {
    fn from(value: FieldElement) -> Self {
        Self::finite(value)
    }
}

impl PartialEq for ExtendedNumber {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl PartialOrd for ExtendedNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl fmt::Display for ExtendedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inf {
            InfinityMarker::Finite => fmt::Display::fmt(&self.value, f),
            InfinityMarker::Positive => f.write_str("inf"),
            InfinityMarker::Negative => f.write_str("-inf"),
        }
    }
}

impl fmt::Debug for ExtendedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inf {
            InfinityMarker::Finite => fmt::Debug::fmt(&self.value, f),
            inf => f
                .debug_struct("Infinity")
                .field("sign", &inf.sign())
                .field("field", &self.field_id())
                .finish(),
        }
    }
}
