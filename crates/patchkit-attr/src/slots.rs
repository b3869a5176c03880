//! Slot tables
//!
//! Every owner keeps its attributes in a [`SlotTable`]. Patching swaps a
//! slot's binding and marks the slot with the [`PatchId`] that did it;
//! restoring swaps the captured binding back and clears the mark. No other
//! path mutates a patched slot.

use crate::binding::Binding;
use crate::error::AttrError;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Identity of one live substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchId(Uuid);

impl PatchId {
    /// Generate fresh id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PatchId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    binding: Binding,
    patched_by: Option<PatchId>,
}

/// Insertion-ordered attribute table of one owner
#[derive(Debug)]
pub struct SlotTable {
    label: String,
    slots: RwLock<IndexMap<String, Slot>>,
}

impl SlotTable {
    /// Create empty table for the owner called `label`
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            slots: RwLock::new(IndexMap::new()),
        }
    }

    /// Create table pre-filled with unpatched `bindings`, in order
    #[must_use]
    pub fn with_bindings(label: impl Into<String>, bindings: IndexMap<String, Binding>) -> Self {
        let slots = bindings
            .into_iter()
            .map(|(name, binding)| {
                let slot = Slot {
                    binding,
                    patched_by: None,
                };
                (name, slot)
            })
            .collect();
        Self {
            label: label.into(),
            slots: RwLock::new(slots),
        }
    }

    /// Owner label used in diagnostics
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Bind `name`, returning the previous binding
    ///
    /// # Errors
    /// Returns [`AttrError::AlreadyPatched`] if the slot is currently patched;
    /// redefining it would make the later restore overwrite the new binding.
    pub fn define(&self, name: &str, binding: Binding) -> Result<Option<Binding>, AttrError> {
        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(name) {
            if slot.patched_by.is_some() {
                return Err(self.already_patched(name));
            }
            return Ok(Some(std::mem::replace(&mut slot.binding, binding)));
        }
        slots.insert(
            name.to_string(),
            Slot {
                binding,
                patched_by: None,
            },
        );
        Ok(None)
    }

    /// Current binding at `name`
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.slots.read().get(name).map(|slot| slot.binding.clone())
    }

    /// Check if `name` is bound
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.slots.read().contains_key(name)
    }

    /// Bound names in definition order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.slots.read().keys().cloned().collect()
    }

    /// Patch currently installed at `name`, if any
    #[must_use]
    pub fn patched_by(&self, name: &str) -> Option<PatchId> {
        self.slots.read().get(name).and_then(|slot| slot.patched_by)
    }

    /// Install `replacement` at `name` on behalf of `id`
    ///
    /// Returns the binding that was there before.
    ///
    /// # Errors
    /// - [`AttrError::NotFound`] if `name` is not bound
    /// - [`AttrError::AlreadyPatched`] if another patch is live on the slot
    pub fn swap_in(&self, name: &str, replacement: Binding, id: PatchId) -> Result<Binding, AttrError> {
        let mut slots = self.slots.write();
        let slot = slots
            .get_mut(name)
            .ok_or_else(|| AttrError::not_found(&self.label, name))?;
        if slot.patched_by.is_some() {
            return Err(self.already_patched(name));
        }
        slot.patched_by = Some(id);
        Ok(std::mem::replace(&mut slot.binding, replacement))
    }

    /// Put `original` back at `name`, ending patch `id`
    ///
    /// Returns the binding that was removed (the substitute).
    ///
    /// # Errors
    /// Returns [`AttrError::NotPatchedBy`] unless `id` is the live patch on
    /// the slot. The slot is left untouched in that case.
    pub fn swap_back(&self, name: &str, id: PatchId, original: Binding) -> Result<Binding, AttrError> {
        let mut slots = self.slots.write();
        match slots.get_mut(name) {
            Some(slot) if slot.patched_by == Some(id) => {
                slot.patched_by = None;
                Ok(std::mem::replace(&mut slot.binding, original))
            }
            _ => Err(AttrError::NotPatchedBy {
                owner: self.label.clone(),
                name: name.to_string(),
            }),
        }
    }

    fn already_patched(&self, name: &str) -> AttrError {
        AttrError::AlreadyPatched {
            owner: self.label.clone(),
            name: name.to_string(),
        }
    }
}
