use std::borrow::Cow;

use crate::compute::DispatchGrid;
use crate::device::{BufferKind, GpuDevice, KernelBindings};
use crate::kernel::bindings as slot;

/// Storage texture written by the kernel, with the view both passes bind
pub struct OutputTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// `GpuDevice` backed by a wgpu device and its queue
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = wgpu::Buffer;
    type Texture = OutputTexture;
    type Kernel = wgpu::ComputePipeline;

    fn create_kernel(&self, source: &str, entry_point: &str) -> wgpu::ComputePipeline {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Raytrace Kernel"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_string())),
        });

        // Layout is derived from the kernel's own bindings.
        self.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Raytrace Pipeline"),
            layout: None,
            module: &module,
            entry_point,
        })
    }

    fn create_buffer(&self, label: &str, kind: BufferKind, size: u64) -> wgpu::Buffer {
        let usage = match kind {
            BufferKind::Storage => wgpu::BufferUsages::STORAGE,
            BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
        };
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, data: &[u8]) {
        self.queue.write_buffer(buffer, 0, data);
    }

    fn release_buffer(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn create_output_texture(&self, width: u32, height: u32) -> OutputTexture {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Raytraced Output Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        OutputTexture { texture, view }
    }

    fn release_texture(&self, texture: OutputTexture) {
        texture.texture.destroy();
    }

    fn dispatch(&self, kernel: &wgpu::ComputePipeline, bindings: KernelBindings<'_, Self>, grid: DispatchGrid) {
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raytrace Bind Group"),
            layout: &kernel.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: slot::SPHERES,
                    resource: bindings.spheres.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::PARAMS,
                    resource: bindings.params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::OUTPUT_TEX,
                    resource: wgpu::BindingResource::TextureView(&bindings.output.view),
                },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Raytrace Encoder"),
        });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Raytrace Pass"),
            });
            compute_pass.set_pipeline(kernel);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            compute_pass.dispatch_workgroups(grid.x, grid.y, grid.z);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
