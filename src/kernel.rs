use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{PipelineError, PipelineResult};

/// WGSL source of the shipped raytrace kernel
pub const RAYTRACE_KERNEL_SOURCE: &str = include_str!("../shaders/raytrace.wgsl");

/// Binding slots in group 0, named after the kernel's globals
pub mod bindings {
    pub const SPHERES: u32 = 0;
    pub const PARAMS: u32 = 1;
    pub const OUTPUT_TEX: u32 = 2;
}

/// A compute entry point resolved from kernel source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelInfo {
    pub entry_point: String,
    pub group_size: [u32; 3],
}

impl KernelInfo {
    /// Parse and validate `source`, then look up `entry_point` and read its workgroup size.
    pub fn reflect(source: &str, entry_point: &str) -> PipelineResult<Self> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| PipelineError::KernelParse(e.emit_to_string(source)))?;

        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .map_err(|e| PipelineError::KernelParse(format!("{:?}", e)))?;

        let entry = module
            .entry_points
            .iter()
            .find(|ep| ep.name == entry_point)
            .ok_or_else(|| PipelineError::KernelNotFound { name: entry_point.to_string() })?;

        if entry.stage != naga::ShaderStage::Compute {
            return Err(PipelineError::KernelNotCompute { name: entry_point.to_string() });
        }

        Ok(Self {
            entry_point: entry.name.clone(),
            group_size: entry.workgroup_size,
        })
    }

    pub fn group_size_xy(&self) -> (u32, u32) {
        (self.group_size[0].max(1), self.group_size[1].max(1))
    }
}
