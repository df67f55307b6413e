//! Ordered record of long-lived GPU objects.
//!
//! Setup records each object as it is created; teardown releases them in
//! reverse order. Only objects that were actually created are ever recorded,
//! so teardown after a partial setup releases exactly that subset.

use crate::gfx::{BufferHandle, GraphicsApi, ProgramHandle, TextureHandle};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GpuResource {
    Program(ProgramHandle),
    Buffer(BufferHandle),
    Texture(TextureHandle),
}

#[derive(Debug, Default)]
pub struct ResourceLedger {
    entries: Vec<GpuResource>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a created object. Recording the same object twice is ignored.
    pub fn record(&mut self, resource: GpuResource) {
        if self.entries.contains(&resource) {
            log::warn!("{resource:?} recorded twice; ignoring");
            return;
        }
        self.entries.push(resource);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &GpuResource> {
        self.entries.iter()
    }

    /// Releases every recorded object, newest first. Returns the count.
    pub fn release_all<G: GraphicsApi>(&mut self, gpu: &mut G) -> usize {
        let mut released = 0;
        while let Some(resource) = self.entries.pop() {
            log::debug!("releasing {resource:?}");
            match resource {
                GpuResource::Program(h) => gpu.release_program(h),
                GpuResource::Buffer(h) => gpu.release_buffer(h),
                GpuResource::Texture(h) => gpu.release_texture(h),
            }
            released += 1;
        }
        released
    }
}

impl Drop for ResourceLedger {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            log::warn!(
                "resource ledger dropped with {} unreleased GPU objects",
                self.entries.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{BufferUsage, HandleAllocator};
    use crate::testing::{Call, MockGpu};

    #[test]
    fn releases_in_reverse_creation_order() {
        let mut gpu = MockGpu::default();
        let mut alloc = HandleAllocator::default();
        let program: ProgramHandle = alloc.next().unwrap();
        let buffer = gpu.create_buffer_for_test(BufferUsage::Vertex);
        let texture: TextureHandle = alloc.next().unwrap();

        let mut ledger = ResourceLedger::new();
        ledger.record(GpuResource::Program(program));
        ledger.record(GpuResource::Buffer(buffer));
        ledger.record(GpuResource::Texture(texture));
        gpu.clear_calls();

        assert_eq!(ledger.release_all(&mut gpu), 3);
        assert_eq!(
            gpu.calls(),
            &[
                Call::ReleaseTexture(texture),
                Call::ReleaseBuffer(buffer),
                Call::ReleaseProgram(program),
            ]
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn duplicate_record_is_released_once() {
        let mut gpu = MockGpu::default();
        let buffer = gpu.create_buffer_for_test(BufferUsage::Index);

        let mut ledger = ResourceLedger::new();
        ledger.record(GpuResource::Buffer(buffer));
        ledger.record(GpuResource::Buffer(buffer));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.release_all(&mut gpu), 1);
        assert_eq!(ledger.release_all(&mut gpu), 0);
        assert!(gpu.invalid_releases().is_empty());
    }
}
