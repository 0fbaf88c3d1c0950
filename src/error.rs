use thiserror::Error;

/// Errors raised by the raytrace pipeline.
///
/// A setup failure leaves no pipeline behind. `tick` reports a missing camera
/// without dispatching anything.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to parse compute kernel: {0}")]
    KernelParse(String),
    #[error("Kernel entry point '{name}' not found")]
    KernelNotFound { name: String },
    #[error("Entry point '{name}' is not a compute kernel")]
    KernelNotCompute { name: String },
    #[error("Missing required component: {0}")]
    MissingComponent(&'static str),
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("No compatible GPU adapter found")]
    AdapterUnavailable,
    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("Pipeline has been shut down")]
    ShutDown,
}

pub type PipelineResult<T> = Result<T, PipelineError>;
