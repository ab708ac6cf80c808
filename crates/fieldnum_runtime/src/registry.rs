//! Dispatch registry: field identifier to operation table.
//!
//! Fields may be registered at any time; only a duplicate or the reserved
//! rational id is refused. A registry can be closed for writing with
//! [`FieldRegistry::seal`], or automatically on its first lookup through
//! [`RegistryConfig::seal_on_first_lookup`]. There is no unregistration.

use std::cell::Cell;
use std::rc::Rc;

use ahash::RandomState;
use fieldnum_core::{Error, FieldId, RawFieldTable, Result};
use hashbrown::HashMap;

use crate::config::RegistryConfig;
use crate::descriptor::{FieldDescriptor, FieldOps};

pub struct FieldRegistry {
    fields: HashMap<FieldId, Rc<FieldDescriptor>, RandomState>,
    config: RegistryConfig,
    sealed: Cell<bool>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            fields: HashMap::with_hasher(RandomState::new()),
            config,
            sealed: Cell::new(false),
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Validate `table` and register it under `id`.
    ///
    /// # Safety
    /// Every present slot must be a valid function that accepts handles
    /// produced by the other slots of the same table, for as long as any
    /// element of the field is alive.
    pub unsafe fn register(
        &mut self,
        id: FieldId,
        table: RawFieldTable,
    ) -> Result<Rc<FieldDescriptor>> {
        if id.is_rational() {
            tracing::warn!("rejected registration of reserved field id 0");
            return Err(Error::ReservedField);
        }
        if self.sealed.get() {
            tracing::warn!(field = %id, "rejected registration on sealed registry");
            return Err(Error::RegistrySealed(id));
        }
        if self.fields.contains_key(&id) {
            tracing::warn!(field = %id, "rejected duplicate registration");
            return Err(Error::DuplicateRegistration(id));
        }
        let ops = FieldOps::from_raw(id, &table)?;
        let desc = Rc::new(FieldDescriptor::new(id, ops));
        self.fields.insert(id, desc.clone());
        tracing::debug!(field = %id, native_abs = desc.has_native_abs(), "registered field");
        Ok(desc)
    }

    /// Untyped entry point for callers holding a pointer to a registration
    /// block, e.g. the foreign runtime's binding layer.
    ///
    /// # Safety
    /// `table` must be null or point to a readable [`RawFieldTable`]; the
    /// requirements of [`FieldRegistry::register`] apply to its slots.
    pub unsafe fn register_raw(
        &mut self,
        id: FieldId,
        table: *const RawFieldTable,
    ) -> Result<Rc<FieldDescriptor>> {
        // SAFETY: guaranteed by the caller.
        let table = match unsafe { table.as_ref() } {
            Some(table) => *table,
            None => RawFieldTable::default(),
        };
        // SAFETY: forwarded contract.
        unsafe { self.register(id, table) }
    }

    /// Descriptor of a registered field. A miss is a configuration error on
    /// the caller's side.
    pub fn lookup(&self, id: FieldId) -> Result<Rc<FieldDescriptor>> {
        let desc = self.fields.get(&id).cloned().ok_or(Error::UnknownField(id))?;
        if self.config.seal_on_first_lookup {
            self.seal();
        }
        Ok(desc)
    }

    /// Reject every later registration.
    pub fn seal(&self) {
        if !self.sealed.replace(true) {
            tracing::debug!(fields = self.fields.len(), "registry sealed");
        }
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.fields.contains_key(&id)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.get()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Registered identifiers in ascending order.
    pub fn ids(&self) -> Vec<FieldId> {
        let mut ids: Vec<FieldId> = self.fields.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}
