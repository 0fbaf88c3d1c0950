use raytrace_shared::{GpuSphere, RaytracerConfig};

use crate::device::{BufferKind, GpuDevice};
use crate::registry::ShapeInstance;

/// Owns the `spheres` storage buffer and keeps it sized to the shape count.
///
/// wgpu rejects zero-sized storage bindings, so an empty scene is backed by a
/// single unused record while `capacity` and `count` both report zero.
pub struct SphereBufferPacker<D: GpuDevice> {
    buffer: Option<D::Buffer>,
    capacity: usize,
    count: usize,
}

impl<D: GpuDevice> SphereBufferPacker<D> {
    pub fn new() -> Self {
        Self {
            buffer: None,
            capacity: 0,
            count: 0,
        }
    }

    /// Byte stride of one packed record
    pub const fn stride() -> usize {
        RaytracerConfig::SPHERE_STRIDE
    }

    /// Convert shapes to kernel records, preserving order
    pub fn encode(shapes: &[ShapeInstance]) -> Vec<GpuSphere> {
        shapes
            .iter()
            .map(|shape| GpuSphere::new(shape.position.to_array(), shape.radius, shape.material))
            .collect()
    }

    /// Rewrite the buffer with `shapes`, reallocating when the count changed
    pub fn pack(&mut self, device: &D, shapes: &[ShapeInstance]) {
        if self.buffer.is_none() || self.capacity != shapes.len() {
            self.reallocate(device, shapes.len());
        }

        self.count = shapes.len();
        if let Some(buffer) = &self.buffer {
            if !shapes.is_empty() {
                let records = Self::encode(shapes);
                device.write_buffer(buffer, bytemuck::cast_slice(&records));
            }
        }
    }

    fn reallocate(&mut self, device: &D, capacity: usize) {
        if let Some(old) = self.buffer.take() {
            device.release_buffer(old);
        }

        let records = capacity.max(1);
        let size = (records * Self::stride()) as u64;
        log::debug!("Allocating sphere buffer: {} records ({} bytes)", capacity, size);

        self.buffer = Some(device.create_buffer("Sphere Buffer", BufferKind::Storage, size));
        self.capacity = capacity;
    }

    /// Release the buffer. Calling this again is a no-op.
    pub fn dispose(&mut self, device: &D) {
        if let Some(buffer) = self.buffer.take() {
            device.release_buffer(buffer);
            log::debug!("Released sphere buffer ({} records)", self.capacity);
        }
        self.capacity = 0;
        self.count = 0;
    }

    pub fn buffer(&self) -> Option<&D::Buffer> {
        self.buffer.as_ref()
    }

    /// Number of records written by the last `pack`
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of records the current buffer was sized for
    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<D: GpuDevice> Default for SphereBufferPacker<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;
    use glam::Vec3;
    use raytrace_shared::RaytraceMaterial;

    fn shapes(n: usize) -> Vec<ShapeInstance> {
        (0..n)
            .map(|i| ShapeInstance {
                position: Vec3::new(i as f32, 0.0, -(i as f32)),
                radius: 1.0 + i as f32,
                material: RaytraceMaterial::new([0.1 * i as f32, 0.0, 0.0, 1.0], 0.5, 0.0, i % 2 == 0),
            })
            .collect()
    }

    fn written(device: &MockDevice, packer: &SphereBufferPacker<MockDevice>) -> Vec<GpuSphere> {
        device
            .contents(packer.buffer().unwrap().id)
            .chunks_exact(RaytracerConfig::SPHERE_STRIDE)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    #[test]
    fn packs_records_in_input_order() {
        let device = MockDevice::new();
        let mut packer = SphereBufferPacker::new();
        let input = shapes(5);

        packer.pack(&device, &input);

        let buffer = packer.buffer().unwrap();
        assert_eq!(buffer.size, 5 * RaytracerConfig::SPHERE_STRIDE as u64);
        assert_eq!(packer.count(), 5);

        let bytes = device.contents(buffer.id);
        assert_eq!(bytes.len(), 5 * SphereBufferPacker::<MockDevice>::stride());

        let records = written(&device, &packer);
        for (record, shape) in records.iter().zip(&input) {
            assert_eq!(record.pos, shape.position.to_array());
            assert_eq!(record.radius, shape.radius);
            assert_eq!(record.material, shape.material);
        }
    }

    #[test]
    fn empty_scene_uses_placeholder_without_writing() {
        let device = MockDevice::new();
        let mut packer = SphereBufferPacker::new();

        packer.pack(&device, &[]);

        let buffer = packer.buffer().unwrap();
        assert_eq!(buffer.size, RaytracerConfig::SPHERE_STRIDE as u64);
        assert_eq!(packer.count(), 0);
        assert_eq!(packer.capacity(), 0);
        assert!(device.contents(buffer.id).is_empty());
    }

    #[test]
    fn reallocates_only_when_count_changes() {
        let device = MockDevice::new();
        let mut packer = SphereBufferPacker::new();

        packer.pack(&device, &shapes(3));
        let first = packer.buffer().unwrap().id;

        packer.pack(&device, &shapes(3));
        assert_eq!(packer.buffer().unwrap().id, first);
        assert_eq!(device.allocations(), 1);

        packer.pack(&device, &shapes(4));
        let second = packer.buffer().unwrap().id;
        assert_ne!(second, first);
        assert!(!device.is_live(first));
        assert_eq!(device.live_count(), 1);

        packer.pack(&device, &[]);
        assert!(!device.is_live(second));
        assert_eq!(device.live_count(), 1);
    }

    #[test]
    fn dispose_is_idempotent_and_pack_recovers() {
        let device = MockDevice::new();
        let mut packer = SphereBufferPacker::new();
        let input = shapes(2);

        packer.pack(&device, &input);
        let fresh = written(&device, &packer);

        packer.dispose(&device);
        assert!(packer.buffer().is_none());
        assert_eq!(device.live_count(), 0);

        // Mock panics on a double release.
        packer.dispose(&device);
        assert_eq!(device.released().len(), 1);

        packer.pack(&device, &input);
        assert_eq!(packer.count(), 2);
        assert_eq!(packer.capacity(), 2);
        assert_eq!(written(&device, &packer), fresh);
    }

    #[test]
    fn degenerate_radius_still_packs() {
        let device = MockDevice::new();
        let mut packer = SphereBufferPacker::new();
        let mut input = shapes(1);
        input[0].radius = -2.0;

        packer.pack(&device, &input);
        assert_eq!(written(&device, &packer)[0].radius, -2.0);
    }
}
