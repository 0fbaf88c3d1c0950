use crate::device::GpuDevice;

/// The render target the kernel writes and the presenter samples
pub struct OutputSurface<T> {
    pub texture: T,
    pub width: u32,
    pub height: u32,
    /// Bumped on every reallocation so consumers can rebuild their bindings
    pub generation: u64,
}

/// Owns the output surface and reallocates it when the requested size changes
pub struct OutputSurfaceManager<D: GpuDevice> {
    surface: Option<OutputSurface<D::Texture>>,
    generation: u64,
}

impl<D: GpuDevice> OutputSurfaceManager<D> {
    pub fn new(device: &D, width: i32, height: i32) -> Self {
        let mut manager = Self {
            surface: None,
            generation: 0,
        };
        manager.ensure_size(device, width, height);
        manager
    }

    /// Clamp a requested size to at least 1x1
    pub fn clamp_extent(width: i32, height: i32) -> (u32, u32) {
        (width.max(1) as u32, height.max(1) as u32)
    }

    /// Make the surface match the requested size. Returns true if it was reallocated.
    pub fn ensure_size(&mut self, device: &D, width: i32, height: i32) -> bool {
        let (clamped_width, clamped_height) = Self::clamp_extent(width, height);
        if width < 1 || height < 1 {
            log::warn!(
                "Output size {}x{} clamped to {}x{}",
                width,
                height,
                clamped_width,
                clamped_height
            );
        }

        if let Some(current) = &self.surface {
            if current.width == clamped_width && current.height == clamped_height {
                return false;
            }
        }

        // Build the replacement first so `current` never sees a partial surface.
        self.generation += 1;
        let replacement = OutputSurface {
            texture: device.create_output_texture(clamped_width, clamped_height),
            width: clamped_width,
            height: clamped_height,
            generation: self.generation,
        };

        if let Some(old) = self.surface.replace(replacement) {
            device.release_texture(old.texture);
        }

        log::info!("Output surface allocated: {}x{}", clamped_width, clamped_height);
        true
    }

    pub fn current(&self) -> Option<&OutputSurface<D::Texture>> {
        self.surface.as_ref()
    }

    /// Release the surface. Calling this again is a no-op.
    pub fn dispose(&mut self, device: &D) {
        if let Some(surface) = self.surface.take() {
            device.release_texture(surface.texture);
        }
    }
}
