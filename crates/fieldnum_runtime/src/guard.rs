//! Lifetime guard for foreign handles.
//!
//! A [`Protected`] owns exactly one handle that has been marked reachable with
//! the foreign collector; dropping it releases the handle. A fresh handle is
//! protected inside [`Protected::adopt`] before control returns to any code
//! that could allocate in the foreign runtime, and replacing a guard
//! (`*slot = next`) drops the old handle only after `next` is protected.

use std::ffi::c_void;
use std::fmt;
use std::rc::Rc;

use fieldnum_core::{Error, FieldId, ForeignHandle, Result};
use num_rational::BigRational;

use crate::descriptor::FieldDescriptor;

pub(crate) struct Protected {
    desc: Rc<FieldDescriptor>,
    handle: ForeignHandle,
}

impl Protected {
    /// Takes ownership of a handle just returned by a slot of `desc`.
    pub(crate) fn adopt(
        desc: &Rc<FieldDescriptor>,
        raw: *mut c_void,
        op: &'static str,
    ) -> Result<Self> {
        let handle = ForeignHandle::new(raw).ok_or(Error::NullHandle {
            field: desc.id(),
            op,
        })?;
        desc.protect(handle);
        Ok(Self {
            desc: desc.clone(),
            handle,
        })
    }

    /// Protected copy of a handle the caller keeps owning.
    pub(crate) fn copy_of(desc: &Rc<FieldDescriptor>, handle: ForeignHandle) -> Result<Self> {
        Self::adopt(desc, desc.copy(handle), "copy")
    }

    pub(crate) fn from_int(desc: &Rc<FieldDescriptor>, value: i64) -> Result<Self> {
        Self::adopt(desc, desc.init(value), "init")
    }

    pub(crate) fn from_rational(desc: &Rc<FieldDescriptor>, value: &BigRational) -> Result<Self> {
        Self::adopt(desc, desc.init_rational(value), "init_from_rational")
    }

    pub(crate) fn try_clone(&self) -> Result<Self> {
        Self::copy_of(&self.desc, self.handle)
    }

    #[inline]
    pub(crate) fn handle(&self) -> ForeignHandle {
        self.handle
    }

    #[inline]
    pub(crate) fn descriptor(&self) -> &Rc<FieldDescriptor> {
        &self.desc
    }

    #[inline]
    pub(crate) fn field_id(&self) -> FieldId {
        self.desc.id()
    }

    pub(crate) fn add(&self, rhs: &Protected) -> Result<Self> {
        Self::adopt(&self.desc, self.desc.add(self.handle, rhs.handle), "add")
    }

    pub(crate) fn sub(&self, rhs: &Protected) -> Result<Self> {
        Self::adopt(&self.desc, self.desc.sub(self.handle, rhs.handle), "sub")
    }

    pub(crate) fn mul(&self, rhs: &Protected) -> Result<Self> {
        Self::adopt(&self.desc, self.desc.mul(self.handle, rhs.handle), "mul")
    }

    pub(crate) fn div(&self, rhs: &Protected) -> Result<Self> {
        Self::adopt(&self.desc, self.desc.div(self.handle, rhs.handle), "div")
    }

    pub(crate) fn pow(&self, exponent: i64) -> Result<Self> {
        Self::adopt(&self.desc, self.desc.pow(self.handle, exponent), "pow")
    }

    pub(crate) fn negate(&self) -> Result<Self> {
        Self::adopt(&self.desc, self.desc.negate(self.handle), "negate")
    }

    pub(crate) fn abs(&self) -> Result<Self> {
        match self.desc.abs(self.handle) {
            Some(raw) => Self::adopt(&self.desc, raw, "abs"),
            None if self.sign() < 0 => self.negate(),
            None => self.try_clone(),
        }
    }

    pub(crate) fn cmp(&self, rhs: &Protected) -> std::cmp::Ordering {
        self.desc.cmp(self.handle, rhs.handle)
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.desc.is_zero(self.handle)
    }

    pub(crate) fn is_one(&self) -> bool {
        self.desc.is_one(self.handle)
    }

    pub(crate) fn sign(&self) -> i64 {
        self.desc.sign(self.handle)
    }

    pub(crate) fn stringify(&self) -> String {
        self.desc.stringify(self.handle)
    }
}

impl Drop for Protected {
    fn drop(&mut self) {
        tracing::trace!(field = %self.desc.id(), handle = ?self.handle, "release");
        self.desc.release(self.handle);
    }
}

impl fmt::Debug for Protected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protected")
            .field("field", &self.desc.id())
            .field("handle", &self.handle)
            .finish()
    }
}
