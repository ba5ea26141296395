//! Fixed-capacity transform pool for one asset type.

use crate::{AssetTypeId, InstanceError, InstanceHandle, InstanceTransform};

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    generation: u32,
    occupied: bool,
}

/// Contiguous transform buffer with a free-list.
///
/// `live_count` never exceeds `capacity`. Slots are handed out in increasing
/// order until the buffer reaches capacity; after that only released slots
/// are reused. Released slots hold [`InstanceTransform::HIDDEN`].
#[derive(Clone, Debug)]
pub struct InstancePool {
    asset: AssetTypeId,
    name: String,
    capacity: u32,
    transforms: Vec<InstanceTransform>,
    /// One per slot ever handed out; outlives `clear` so old handles go stale.
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: u32,
}

impl InstancePool {
    /// Create an empty pool.
    pub fn new(asset: AssetTypeId, name: &str, capacity: u32) -> Self {
        Self {
            asset,
            name: name.to_string(),
            capacity,
            transforms: Vec::new(),
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Write a transform into the next free slot.
    ///
    /// # Errors
    ///
    /// [`InstanceError::PoolOverflow`] when every slot is live.
    pub fn acquire(&mut self, transform: InstanceTransform) -> Result<InstanceHandle, InstanceError> {
        let index = if let Some(index) = self.free.pop() {
            index
        } else if (self.transforms.len() as u32) < self.capacity {
            let index = self.transforms.len() as u32;
            self.transforms.push(InstanceTransform::HIDDEN);
            if self.slots.len() <= index as usize {
                self.slots.push(Slot::default());
            }
            index
        } else {
            return Err(InstanceError::PoolOverflow {
                asset: self.name.clone(),
                capacity: self.capacity,
            });
        };

        let slot = &mut self.slots[index as usize];
        slot.occupied = true;
        self.transforms[index as usize] = transform;
        self.live += 1;
        Ok(InstanceHandle {
            asset: self.asset,
            index,
            generation: slot.generation,
        })
    }

    /// Free a slot.
    ///
    /// # Errors
    ///
    /// [`InstanceError::StaleHandle`] if the handle does not refer to a live
    /// slot of this pool.
    pub fn release(&mut self, handle: InstanceHandle) -> Result<(), InstanceError> {
        self.check(handle)?;
        let index = handle.index as usize;
        let slot = &mut self.slots[index];
        slot.occupied = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.transforms[index] = InstanceTransform::HIDDEN;
        self.free.push(handle.index);
        self.live -= 1;
        Ok(())
    }

    /// Overwrite a live instance's transform.
    ///
    /// # Errors
    ///
    /// [`InstanceError::StaleHandle`] if the handle is not live.
    pub fn update(
        &mut self,
        handle: InstanceHandle,
        transform: InstanceTransform,
    ) -> Result<(), InstanceError> {
        self.check(handle)?;
        self.transforms[handle.index as usize] = transform;
        Ok(())
    }

    /// Transform of a live instance.
    pub fn get(&self, handle: InstanceHandle) -> Option<&InstanceTransform> {
        self.check(handle).ok()?;
        self.transforms.get(handle.index as usize)
    }

    /// Release every slot. Outstanding handles become stale.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.occupied) {
            slot.occupied = false;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.transforms.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Asset type id.
    pub fn asset(&self) -> AssetTypeId {
        self.asset
    }

    /// Asset type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of live instances.
    pub fn live_count(&self) -> u32 {
        self.live
    }

    /// The transform buffer up to the highest slot handed out. Free slots
    /// inside it hold hidden transforms.
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// The buffer as raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }

    fn check(&self, handle: InstanceHandle) -> Result<(), InstanceError> {
        if handle.asset != self.asset {
            return Err(InstanceError::StaleHandle);
        }
        match self.slots.get(handle.index as usize) {
            Some(slot) if slot.occupied && slot.generation == handle.generation => Ok(()),
            _ => Err(InstanceError::StaleHandle),
        }
    }
}
