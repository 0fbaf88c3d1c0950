#![no_std]

use bytemuck::{Pod, Zeroable};

/// Configuration constants for the raytracer
pub struct RaytracerConfig;

impl RaytracerConfig {
    /// Byte stride of one `Sphere` record in the kernel's `spheres` array.
    /// Agreed with `shaders/raytrace.wgsl`, never derived from field sizes.
    pub const SPHERE_STRIDE: usize = 48;
    /// Byte size of the kernel's `Material` struct (vec4 + 3 scalars, rounded to 16).
    pub const MATERIAL_SIZE: usize = 32;
    /// Byte size of the `params` uniform block.
    pub const KERNEL_PARAMS_SIZE: usize = 80;

    pub const DEFAULT_KERNEL_ENTRY_POINT: &'static str = "raytrace";
    pub const DEFAULT_OUTPUT_WIDTH: i32 = 1280;
    pub const DEFAULT_OUTPUT_HEIGHT: i32 = 720;
    pub const DEFAULT_FOV_Y_DEGREES: f32 = 60.0;
    pub const DEFAULT_NEAR_CLIP: f32 = 0.1;

    pub const PERFORMANCE_STATS_INTERVAL: u64 = 60; // frames
    pub const MILLISECONDS_PER_SECOND: f32 = 1000.0;
}

/// Surface appearance of a raytraced shape
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RaytraceMaterial {
    pub color: [f32; 4],     // rgba (16 bytes)
    pub smoothness: f32,     // 0 = rough, 1 = mirror (4 bytes)
    pub emissive: f32,       // emission strength (4 bytes)
    pub is_metal: i32,       // 0 or 1 (4 bytes)
    pub _padding: i32,       // struct rounds up to vec4 alignment (4 bytes)
    // Total: 32 bytes
}

/// Sphere record as read by the kernel
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct GpuSphere {
    pub pos: [f32; 3],              // World-space center (12 bytes)
    pub radius: f32,                // (4 bytes)
    pub material: RaytraceMaterial, // (32 bytes)
    // Total: 48 bytes
}

/// Uniform block bound as `params`.
///
/// Every vec3 is followed by a scalar so rows stay 16 bytes wide, which is
/// what WGSL's uniform layout expects.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct KernelParams {
    pub cam_pos: [f32; 3],
    pub num_spheres: u32,
    pub cam_right: [f32; 3],
    pub cam_near_clip_dist: f32,
    pub cam_up: [f32; 3],
    pub cam_near_clip_width: f32,
    pub cam_forward: [f32; 3],
    pub cam_near_clip_height: f32,
    pub output_tex_width: u32,
    pub output_tex_height: u32,
    pub _padding: [u32; 2],
}

const _: () = assert!(core::mem::size_of::<RaytraceMaterial>() == RaytracerConfig::MATERIAL_SIZE);
const _: () = assert!(core::mem::size_of::<GpuSphere>() == RaytracerConfig::SPHERE_STRIDE);
const _: () = assert!(core::mem::size_of::<KernelParams>() == RaytracerConfig::KERNEL_PARAMS_SIZE);

impl RaytraceMaterial {
    pub fn new(color: [f32; 4], smoothness: f32, emissive: f32, is_metal: bool) -> Self {
        Self {
            color,
            smoothness,
            emissive,
            is_metal: is_metal as i32,
            _padding: 0,
        }
    }

    /// Create a rough, non-metallic material
    pub fn diffuse(color: [f32; 4]) -> Self {
        Self::new(color, 0.0, 0.0, false)
    }

    /// Create a metallic material
    pub fn metal(color: [f32; 4], smoothness: f32) -> Self {
        Self::new(color, smoothness, 0.0, true)
    }

    /// Create an emissive material
    pub fn emissive(color: [f32; 4], strength: f32) -> Self {
        Self::new(color, 0.0, strength, false)
    }

    pub fn is_metal(&self) -> bool {
        self.is_metal != 0
    }
}

impl Default for RaytraceMaterial {
    fn default() -> Self {
        Self::diffuse([1.0, 1.0, 1.0, 1.0])
    }
}

impl GpuSphere {
    pub fn new(pos: [f32; 3], radius: f32, material: RaytraceMaterial) -> Self {
        Self { pos, radius, material }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn material_layout_matches_kernel() {
        assert_eq!(size_of::<RaytraceMaterial>(), 32);
        assert_eq!(offset_of!(RaytraceMaterial, color), 0);
        assert_eq!(offset_of!(RaytraceMaterial, smoothness), 16);
        assert_eq!(offset_of!(RaytraceMaterial, emissive), 20);
        assert_eq!(offset_of!(RaytraceMaterial, is_metal), 24);
    }

    #[test]
    fn sphere_layout_matches_kernel() {
        assert_eq!(size_of::<GpuSphere>(), RaytracerConfig::SPHERE_STRIDE);
        assert_eq!(offset_of!(GpuSphere, pos), 0);
        assert_eq!(offset_of!(GpuSphere, radius), 12);
        assert_eq!(offset_of!(GpuSphere, material), 16);
    }

    #[test]
    fn kernel_params_layout_matches_kernel() {
        assert_eq!(size_of::<KernelParams>(), 80);
        assert_eq!(offset_of!(KernelParams, num_spheres), 12);
        assert_eq!(offset_of!(KernelParams, cam_right), 16);
        assert_eq!(offset_of!(KernelParams, cam_near_clip_dist), 28);
        assert_eq!(offset_of!(KernelParams, cam_up), 32);
        assert_eq!(offset_of!(KernelParams, cam_near_clip_width), 44);
        assert_eq!(offset_of!(KernelParams, cam_forward), 48);
        assert_eq!(offset_of!(KernelParams, cam_near_clip_height), 60);
        assert_eq!(offset_of!(KernelParams, output_tex_width), 64);
        assert_eq!(offset_of!(KernelParams, output_tex_height), 68);
    }

    #[test]
    fn material_fields_pack_in_declared_order() {
        let material = RaytraceMaterial::new([0.1, 0.2, 0.3, 0.4], 0.5, 2.0, true);
        let words: &[u32] = bytemuck::cast_slice(core::slice::from_ref(&material));

        assert_eq!(f32::from_bits(words[0]), 0.1);
        assert_eq!(f32::from_bits(words[3]), 0.4);
        assert_eq!(f32::from_bits(words[4]), 0.5);
        assert_eq!(f32::from_bits(words[5]), 2.0);
        assert_eq!(words[6], 1);
        assert_eq!(words[7], 0);
    }

    #[test]
    fn material_constructors() {
        assert!(!RaytraceMaterial::diffuse([1.0; 4]).is_metal());
        assert!(RaytraceMaterial::metal([1.0; 4], 0.9).is_metal());
        assert_eq!(RaytraceMaterial::emissive([1.0; 4], 3.0).emissive, 3.0);
    }
}
