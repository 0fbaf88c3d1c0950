use crate::compute::DispatchGrid;

/// What a buffer is bound as in the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Storage,
    Uniform,
}

/// Resources bound to the raytrace kernel for one dispatch
pub struct KernelBindings<'a, D: GpuDevice + ?Sized> {
    pub spheres: &'a D::Buffer,
    pub params: &'a D::Buffer,
    pub output: &'a D::Texture,
}

/// Host-side GPU primitives the frame pipeline is built on.
///
/// Resources are handed back through `release_*` so ownership stays explicit;
/// callers must release each resource at most once.
pub trait GpuDevice {
    type Buffer;
    type Texture;
    type Kernel;

    fn create_kernel(&self, source: &str, entry_point: &str) -> Self::Kernel;

    fn create_buffer(&self, label: &str, kind: BufferKind, size: u64) -> Self::Buffer;
    fn write_buffer(&self, buffer: &Self::Buffer, data: &[u8]);
    fn release_buffer(&self, buffer: Self::Buffer);

    /// Create an RGBA8 texture the kernel can write and the presenter can sample
    fn create_output_texture(&self, width: u32, height: u32) -> Self::Texture;
    fn release_texture(&self, texture: Self::Texture);

    /// Bind and dispatch without waiting for completion
    fn dispatch(&self, kernel: &Self::Kernel, bindings: KernelBindings<'_, Self>, grid: DispatchGrid);
}
