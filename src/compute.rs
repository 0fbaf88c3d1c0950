use std::sync::Arc;

use raytrace_shared::KernelParams;

use crate::buffers::SphereBufferPacker;
use crate::camera::CameraBasis;
use crate::config::PipelineConfig;
use crate::device::{BufferKind, GpuDevice, KernelBindings};
use crate::error::{PipelineError, PipelineResult};
use crate::kernel::KernelInfo;
use crate::output::{OutputSurface, OutputSurfaceManager};
use crate::registry::ShapeRegistry;
use crate::scene::SceneNode;

/// Workgroup counts for one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGrid {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl DispatchGrid {
    /// Floor-divide the surface by the group size, with at least one group per axis.
    ///
    /// Sizes that are not a multiple of the group size leave the right and
    /// bottom border undispatched.
    pub fn for_surface(width: u32, height: u32, group_size: (u32, u32)) -> Self {
        Self {
            x: (width / group_size.0.max(1)).max(1),
            y: (height / group_size.1.max(1)).max(1),
            z: 1,
        }
    }
}

/// What one `tick` submitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub sphere_count: usize,
    pub basis: CameraBasis,
    pub grid: DispatchGrid,
}

/// Per-frame orchestration: scan the scene, pack spheres, compute the camera
/// basis, bind everything and dispatch the raytrace kernel.
pub struct RaytracePipeline<D: GpuDevice> {
    device: Arc<D>,
    kernel_info: KernelInfo,
    kernel: D::Kernel,
    params_buffer: Option<D::Buffer>,
    packer: SphereBufferPacker<D>,
    surfaces: OutputSurfaceManager<D>,
    shut_down: bool,
}

impl<D: GpuDevice> RaytracePipeline<D> {
    /// Resolve the kernel and allocate the output surface and params buffer.
    ///
    /// `scene` must hold an active camera. Any error here is fatal and happens
    /// before the first allocation.
    pub fn initialize(device: Arc<D>, config: &PipelineConfig, scene: &SceneNode) -> PipelineResult<Self> {
        if ShapeRegistry::find_camera(scene).is_none() {
            return Err(PipelineError::MissingComponent("camera"));
        }
        let kernel_info = KernelInfo::reflect(&config.kernel_source, &config.kernel_entry_point)?;
        log::info!(
            "Resolved kernel '{}' with workgroup size {:?}",
            kernel_info.entry_point,
            kernel_info.group_size
        );

        let kernel = device.create_kernel(&config.kernel_source, &kernel_info.entry_point);
        let params_buffer = device.create_buffer(
            "Kernel Params Buffer",
            BufferKind::Uniform,
            std::mem::size_of::<KernelParams>() as u64,
        );
        let surfaces = OutputSurfaceManager::new(device.as_ref(), config.output_width, config.output_height);

        Ok(Self {
            device,
            kernel_info,
            kernel,
            params_buffer: Some(params_buffer),
            packer: SphereBufferPacker::new(),
            surfaces,
            shut_down: false,
        })
    }

    /// Prepare and dispatch one frame. Never waits for the GPU.
    pub fn tick(&mut self, scene: &SceneNode) -> PipelineResult<FrameReport> {
        if self.shut_down {
            return Err(PipelineError::ShutDown);
        }
        let camera = ShapeRegistry::find_camera(scene).ok_or(PipelineError::MissingComponent("camera"))?;

        let shapes = ShapeRegistry::collect(scene);
        self.packer.pack(&self.device, &shapes);

        let basis = CameraBasis::compute(&camera);

        let (Some(surface), Some(spheres), Some(params_buffer)) =
            (self.surfaces.current(), self.packer.buffer(), self.params_buffer.as_ref())
        else {
            return Err(PipelineError::ShutDown);
        };

        let params = Self::kernel_params(&basis, self.packer.count(), surface);
        self.device.write_buffer(params_buffer, bytemuck::bytes_of(&params));

        let grid = DispatchGrid::for_surface(surface.width, surface.height, self.kernel_info.group_size_xy());
        log::debug!(
            "Dispatching {} spheres to {}x{} surface as {:?}",
            shapes.len(),
            surface.width,
            surface.height,
            grid
        );

        let bindings = KernelBindings {
            spheres,
            params: params_buffer,
            output: &surface.texture,
        };
        self.device.dispatch(&self.kernel, bindings, grid);

        Ok(FrameReport {
            sphere_count: shapes.len(),
            basis,
            grid,
        })
    }

    fn kernel_params(basis: &CameraBasis, sphere_count: usize, surface: &OutputSurface<D::Texture>) -> KernelParams {
        KernelParams {
            cam_pos: basis.position.to_array(),
            num_spheres: sphere_count as u32,
            cam_right: basis.right.to_array(),
            cam_near_clip_dist: basis.near_clip_distance,
            cam_up: basis.up.to_array(),
            cam_near_clip_width: basis.near_clip_width,
            cam_forward: basis.forward.to_array(),
            cam_near_clip_height: basis.near_clip_height,
            output_tex_width: surface.width,
            output_tex_height: surface.height,
            _padding: [0; 2],
        }
    }

    /// Apply an output size edit while running. Returns true if the surface was reallocated.
    pub fn set_output_size(&mut self, width: i32, height: i32) -> PipelineResult<bool> {
        if self.shut_down {
            return Err(PipelineError::ShutDown);
        }
        Ok(self.surfaces.ensure_size(&self.device, width, height))
    }

    /// Scale the current output size by `numerator / denominator`, keeping each
    /// dimension within `1..=max_dimension`. Returns true if the surface was reallocated.
    pub fn scale_output_size(&mut self, numerator: u32, denominator: u32, max_dimension: u32) -> PipelineResult<bool> {
        let (width, height) = self
            .output_surface()
            .map(|surface| (surface.width, surface.height))
            .ok_or(PipelineError::ShutDown)?;

        let max_dimension = max_dimension.clamp(1, i32::MAX as u32);
        let scale = |v: u32| (v.saturating_mul(numerator) / denominator.max(1)).clamp(1, max_dimension);
        self.set_output_size(scale(width) as i32, scale(height) as i32)
    }

    /// Release every GPU resource. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.packer.dispose(&self.device);
        self.surfaces.dispose(&self.device);
        if let Some(buffer) = self.params_buffer.take() {
            self.device.release_buffer(buffer);
        }
        self.shut_down = true;
        log::info!("Raytrace pipeline shut down");
    }

    #[cfg(test)]
    pub fn group_size(&self) -> (u32, u32) {
        self.kernel_info.group_size_xy()
    }

    pub fn output_surface(&self) -> Option<&OutputSurface<D::Texture>> {
        self.surfaces.current()
    }

    /// Spheres packed by the last tick
    #[cfg(test)]
    pub fn shape_count(&self) -> usize {
        self.packer.count()
    }
}

impl<D: GpuDevice> Drop for RaytracePipeline<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
