use crate::{AssetTypeId, InstanceTransform};

/// One asset type's instances, ready for a single instanced draw.
#[derive(Clone, Copy, Debug)]
pub struct InstanceBatch<'a> {
    /// Asset type.
    pub asset: AssetTypeId,
    /// Asset name.
    pub name: &'a str,
    /// Transform buffer; free slots hold hidden transforms.
    pub transforms: &'a [InstanceTransform],
    /// Live instances in the buffer.
    pub live: u32,
}

impl InstanceBatch<'_> {
    /// Instance count to pass to the draw call.
    pub fn instance_count(&self) -> u32 {
        self.transforms.len() as u32
    }

    /// The buffer as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.transforms)
    }
}
