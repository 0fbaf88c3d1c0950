use std::sync::Arc;

use raytrace_shared::RaytracerConfig;

use crate::compute::FrameReport;
use crate::error::{PipelineError, PipelineResult};
use crate::output::OutputSurface;
use crate::wgpu_device::{OutputTexture, WgpuDevice};

const PRESENT_SHADER_SOURCE: &str = include_str!("../shaders/present.wgsl");

/// Window surface and the blit pass that presents the output surface
pub struct RenderState {
    pub surface: wgpu::Surface,
    pub device: Arc<WgpuDevice>,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    render_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,

    // Rebuilt whenever the output surface generation changes
    render_bind_group: Option<(u64, wgpu::BindGroup)>,
}

/// Performance tracking
pub struct PerformanceState {
    pub start_time: std::time::Instant,
    pub last_dispatch_time: std::time::Duration,
    pub last_frame: Option<FrameReport>,
    pub frame_count: u64,
}

impl RenderState {
    pub async fn new(window: &winit::window::Window) -> PipelineResult<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = unsafe { instance.create_surface(&window) }?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(PipelineError::AdapterUnavailable)?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(PipelineError::AdapterUnavailable)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Output Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let render_pipeline = Self::create_render_pipeline(&device, surface_format);

        Ok(Self {
            surface,
            device: Arc::new(WgpuDevice::new(device, queue)),
            config,
            size,
            render_pipeline,
            sampler,
            render_bind_group: None,
        })
    }

    fn create_render_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shader"),
            source: wgpu::ShaderSource::Wgsl(PRESENT_SHADER_SOURCE.into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Present Pipeline"),
            layout: None,
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "main_vs",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "main_fs",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device.device, &self.config);
        }
    }

    /// Aspect ratio of the window, used for the camera lens
    pub fn aspect(&self) -> f32 {
        self.size.width.max(1) as f32 / self.size.height.max(1) as f32
    }

    fn refresh_bind_group(&mut self, output: &OutputSurface<OutputTexture>) {
        let stale = !matches!(&self.render_bind_group, Some((generation, _)) if *generation == output.generation);
        if stale {
            log::debug!("Rebuilding present bind group for surface generation {}", output.generation);
            let bind_group = self.device.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Present Bind Group"),
                layout: &self.render_pipeline.get_bind_group_layout(0),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&output.texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.render_bind_group = Some((output.generation, bind_group));
        }
    }

    /// Draw the output surface to the window
    pub fn render(&mut self, output: &OutputSurface<OutputTexture>) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });

        self.refresh_bind_group(output);
        if let Some((_, bind_group)) = &self.render_bind_group {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Draw fullscreen triangle
        }

        self.device.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}

impl PerformanceState {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            last_dispatch_time: std::time::Duration::ZERO,
            last_frame: None,
            frame_count: 0,
        }
    }

    /// Count a frame and report its rate every `PERFORMANCE_STATS_INTERVAL` frames.
    /// Returns true on frames where stats were reported.
    pub fn update_frame_count(&mut self) -> bool {
        self.frame_count += 1;

        if self.frame_count % RaytracerConfig::PERFORMANCE_STATS_INTERVAL == 0 {
            let elapsed = self.start_time.elapsed().as_secs_f32().max(f32::EPSILON);
            let fps = self.frame_count as f32 / elapsed;
            log::info!(
                "FPS: {:.1}, Last dispatch: {:.2}ms",
                fps,
                self.last_dispatch_time.as_secs_f32() * RaytracerConfig::MILLISECONDS_PER_SECOND
            );
            if let Some(frame) = &self.last_frame {
                log::info!(
                    "{} spheres, {}x{} groups, camera at {} facing {}",
                    frame.sphere_count,
                    frame.grid.x,
                    frame.grid.y,
                    frame.basis.position,
                    frame.basis.forward
                );
            }
            return true;
        }
        false
    }
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self::new()
    }
}
