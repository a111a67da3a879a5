/*!
 * Descriptor Registry
 * Maps sandbox-visible descriptors to native handles under granted rights
 */

use super::types::{DescriptorInfo, Rejected, RegistryError};
use crate::acquire::NativeHandle;
use crate::core::limits::MAX_GUEST_DESCRIPTOR;
use crate::core::types::DescriptorId;
use crate::metadata::ResourceType;
use crate::rights::RightsSet;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

struct DescriptorEntry {
    handle: NativeHandle,
    info: DescriptorInfo,
}

#[derive(Default)]
struct Slots {
    entries: Vec<Option<DescriptorEntry>>,
    live: usize,
}

/// Descriptor table for one sandbox
///
/// # Design
/// - One mutex per registry; every insert, lookup and removal takes it
/// - Ids are the lowest free slot at or above `first`, so a live id is never
///   handed out twice
/// - Handles leave the table before they are dropped, so a slow close never
///   runs under the lock
pub struct DescriptorRegistry {
    slots: Mutex<Slots>,
    capacity: usize,
    first: DescriptorId,
    max_rights: RightsSet,
}

impl DescriptorRegistry {
    /// Create a table of up to `capacity` slots starting at `first`
    ///
    /// Slots whose id would exceed [`MAX_GUEST_DESCRIPTOR`] are never handed
    /// out, so the effective capacity may be smaller than requested.
    pub fn new(capacity: usize, first: DescriptorId, max_rights: RightsSet) -> Self {
        let addressable = (MAX_GUEST_DESCRIPTOR as u64 + 1).saturating_sub(first as u64);
        let capacity = capacity.min(usize::try_from(addressable).unwrap_or(usize::MAX));
        if capacity == 0 {
            warn!(first, "descriptor range leaves no usable slots");
        }
        debug!(capacity, first, max_rights = %max_rights, "descriptor registry created");
        Self {
            slots: Mutex::new(Slots::default()),
            capacity,
            first,
            max_rights,
        }
    }

    /// Admit `handle` under `rights`
    ///
    /// On success the registry owns the handle. On failure it is handed back
    /// inside [`Rejected`] and the caller must release it.
    pub fn insert(
        &self,
        handle: NativeHandle,
        resource_type: ResourceType,
        rights: RightsSet,
    ) -> Result<DescriptorId, Rejected> {
        if !rights.is_subset_of(&self.max_rights) {
            warn!(requested = %rights, maximum = %self.max_rights, "rights exceed sandbox maximum");
            return Err(Rejected {
                error: RegistryError::RightsExceeded {
                    requested: rights,
                    maximum: self.max_rights,
                },
                handle,
            });
        }

        let mut slots = self.slots.lock();
        let free = slots.entries.iter().position(Option::is_none);
        let index = free.unwrap_or(slots.entries.len());
        let id = match self.id_of(index) {
            Some(id) => id,
            None => {
                warn!(capacity = self.capacity, "descriptor table full");
                return Err(Rejected {
                    error: RegistryError::TableFull {
                        capacity: self.capacity,
                    },
                    handle,
                });
            }
        };
        if free.is_none() {
            slots.entries.push(None);
        }

        slots.entries[index] = Some(DescriptorEntry {
            handle,
            info: DescriptorInfo {
                resource_type,
                rights,
            },
        });
        slots.live += 1;

        trace!(id, resource_type = %resource_type, "descriptor inserted");
        Ok(id)
    }

    /// Type and rights recorded for `id`
    pub fn lookup(&self, id: DescriptorId) -> Option<DescriptorInfo> {
        let index = self.index_of(id)?;
        self.slots
            .lock()
            .entries
            .get(index)
            .and_then(|slot| slot.as_ref().map(|entry| entry.info))
    }

    /// Run `f` against the handle behind `id` while holding the table lock
    pub fn with_handle<R, F>(&self, id: DescriptorId, f: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&NativeHandle, &DescriptorInfo) -> R,
    {
        let index = self.index_of(id).ok_or(RegistryError::BadDescriptor(id))?;
        let slots = self.slots.lock();
        let entry = slots
            .entries
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(RegistryError::BadDescriptor(id))?;
        Ok(f(&entry.handle, &entry.info))
    }

    /// Narrow the rights of `id`; widening is refused
    pub fn restrict(&self, id: DescriptorId, rights: RightsSet) -> Result<(), RegistryError> {
        let index = self.index_of(id).ok_or(RegistryError::BadDescriptor(id))?;
        let mut slots = self.slots.lock();
        let entry = slots
            .entries
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(RegistryError::BadDescriptor(id))?;

        if !rights.is_subset_of(&entry.info.rights) {
            return Err(RegistryError::RightsExceeded {
                requested: rights,
                maximum: entry.info.rights,
            });
        }
        entry.info.rights = rights;
        Ok(())
    }

    /// Detach the handle behind `id`, transferring ownership to the caller
    pub fn take(&self, id: DescriptorId) -> Result<NativeHandle, RegistryError> {
        let index = self.index_of(id).ok_or(RegistryError::BadDescriptor(id))?;
        let mut slots = self.slots.lock();
        let entry = slots
            .entries
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(RegistryError::BadDescriptor(id))?;
        slots.live -= 1;
        trace!(id, "descriptor removed");
        Ok(entry.handle)
    }

    /// Remove `id` and release its native handle
    pub fn remove(&self, id: DescriptorId) -> Result<(), RegistryError> {
        let handle = self.take(id)?;
        drop(handle);
        Ok(())
    }

    /// Number of live descriptors
    pub fn len(&self) -> usize {
        self.slots.lock().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_rights(&self) -> RightsSet {
        self.max_rights
    }

    fn id_of(&self, index: usize) -> Option<DescriptorId> {
        if index >= self.capacity {
            return None;
        }
        DescriptorId::try_from(index)
            .ok()
            .and_then(|offset| self.first.checked_add(offset))
            .filter(|id| *id <= MAX_GUEST_DESCRIPTOR)
    }

    fn index_of(&self, id: DescriptorId) -> Option<usize> {
        id.checked_sub(self.first)
            .map(|offset| offset as usize)
            .filter(|index| *index < self.capacity)
    }
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorRegistry")
            .field("live", &self.len())
            .field("capacity", &self.capacity)
            .field("first", &self.first)
            .field("max_rights", &self.max_rights)
            .finish()
    }
}
