use clap::Parser;
use winit::{
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

mod buffers;
mod camera;
mod compute;
mod config;
mod device;
mod error;
mod kernel;
mod output;
mod registry;
mod renderer;
mod scene;
mod wgpu_device;

use compute::RaytracePipeline;
use config::{Args, PipelineConfig};
use error::PipelineResult;
use renderer::{PerformanceState, RenderState};
use scene::{Component, SceneBuilder, SceneNode};
use wgpu_device::WgpuDevice;

const CAMERA_NODE: &str = "Main Camera";
const ORBIT_NODE: &str = "Orbit";

/// Everything the event loop drives
struct App {
    render_state: RenderState,
    pipeline: RaytracePipeline<WgpuDevice>,
    scene: SceneNode,
    stats: PerformanceState,
}

impl App {
    fn new(render_state: RenderState, config: &PipelineConfig) -> PipelineResult<Self> {
        let scene = SceneBuilder::build_default_scene(render_state.aspect());
        let pipeline = RaytracePipeline::initialize(render_state.device.clone(), config, &scene)?;

        Ok(Self {
            render_state,
            pipeline,
            scene,
            stats: PerformanceState::new(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.render_state.resize(new_size);

        let aspect = self.render_state.aspect();
        if let Some(node) = self.scene.find_mut(CAMERA_NODE) {
            if let Some(Component::Camera(lens)) = &mut node.component {
                lens.aspect = aspect;
            }
        }
    }

    fn scale_output(&mut self, numerator: u32, denominator: u32) -> PipelineResult<()> {
        let max_dimension = self.render_state.device.device.limits().max_texture_dimension_2d;
        self.pipeline.scale_output_size(numerator, denominator, max_dimension)?;
        Ok(())
    }

    fn toggle_orbit(&mut self) {
        if let Some(node) = self.scene.find_mut(ORBIT_NODE) {
            node.active = !node.active;
            log::info!("Orbit spheres {}", if node.active { "shown" } else { "hidden" });
        }
    }

    fn frame(&mut self) -> PipelineResult<Result<(), wgpu::SurfaceError>> {
        let dispatch_start = std::time::Instant::now();
        let report = self.pipeline.tick(&self.scene)?;
        self.stats.last_dispatch_time = dispatch_start.elapsed();
        self.stats.last_frame = Some(report);
        self.stats.update_frame_count();

        let Some(output) = self.pipeline.output_surface() else {
            return Ok(Ok(()));
        };
        Ok(self.render_state.render(output))
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = pollster::block_on(run(args)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> PipelineResult<()> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Sphere Raytracer")
        .with_inner_size(winit::dpi::PhysicalSize::new(args.window_width, args.window_height))
        .build(&event_loop)?;

    let render_state = RenderState::new(&window).await?;
    let mut app = App::new(render_state, &PipelineConfig::from(&args))?;

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => control_flow.set_exit(),
                WindowEvent::Resized(physical_size) => {
                    app.resize(*physical_size);
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    app.resize(**new_inner_size);
                }
                WindowEvent::KeyboardInput {
                    input: KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(key),
                        ..
                    },
                    ..
                } => {
                    let result = match key {
                        VirtualKeyCode::LBracket => app.scale_output(1, 2),
                        VirtualKeyCode::RBracket => app.scale_output(2, 1),
                        VirtualKeyCode::H => {
                            app.toggle_orbit();
                            Ok(())
                        }
                        VirtualKeyCode::Escape => {
                            control_flow.set_exit();
                            Ok(())
                        }
                        _ => Ok(()),
                    };
                    if let Err(e) = result {
                        log::error!("{}", e);
                        control_flow.set_exit();
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(window_id) if window_id == window.id() => match app.frame() {
                Ok(Ok(())) => {}
                Ok(Err(wgpu::SurfaceError::Lost)) => app.resize(app.render_state.size),
                Ok(Err(wgpu::SurfaceError::OutOfMemory)) => control_flow.set_exit(),
                Ok(Err(e)) => log::warn!("{:?}", e),
                Err(e) => {
                    log::error!("{}", e);
                    control_flow.set_exit();
                }
            },
            Event::MainEventsCleared => {
                window.request_redraw();
            }
            Event::LoopDestroyed => {
                app.pipeline.shutdown();
            }
            _ => {}
        }
    });
}
