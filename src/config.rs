use clap::Parser;
use raytrace_shared::RaytracerConfig;

use crate::kernel::RAYTRACE_KERNEL_SOURCE;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "sphere_raytracer", about = "Real-time compute-shader sphere raytracer", version)]
pub struct Args {
    /// Compute entry point of the raytrace kernel.
    #[arg(long, default_value = RaytracerConfig::DEFAULT_KERNEL_ENTRY_POINT)]
    pub kernel: String,

    /// Output surface width in pixels. Values below 1 are clamped.
    #[arg(long, default_value_t = RaytracerConfig::DEFAULT_OUTPUT_WIDTH, allow_negative_numbers = true)]
    pub width: i32,

    /// Output surface height in pixels. Values below 1 are clamped.
    #[arg(long, default_value_t = RaytracerConfig::DEFAULT_OUTPUT_HEIGHT, allow_negative_numbers = true)]
    pub height: i32,

    /// Initial window width in pixels.
    #[arg(long, default_value = "1280")]
    pub window_width: u32,

    /// Initial window height in pixels.
    #[arg(long, default_value = "720")]
    pub window_height: u32,
}

/// Settings the raytrace pipeline is initialized with
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub kernel_source: String,
    pub kernel_entry_point: String,
    pub output_width: i32,
    pub output_height: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kernel_source: RAYTRACE_KERNEL_SOURCE.to_string(),
            kernel_entry_point: RaytracerConfig::DEFAULT_KERNEL_ENTRY_POINT.to_string(),
            output_width: RaytracerConfig::DEFAULT_OUTPUT_WIDTH,
            output_height: RaytracerConfig::DEFAULT_OUTPUT_HEIGHT,
        }
    }
}

impl From<&Args> for PipelineConfig {
    fn from(args: &Args) -> Self {
        Self {
            kernel_entry_point: args.kernel.clone(),
            output_width: args.width,
            output_height: args.height,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shared_config() {
        let args = Args::parse_from(["sphere_raytracer"]);
        let config = PipelineConfig::from(&args);
        assert_eq!(config.kernel_entry_point, "raytrace");
        assert_eq!(config.output_width, RaytracerConfig::DEFAULT_OUTPUT_WIDTH);
        assert_eq!(config.output_height, RaytracerConfig::DEFAULT_OUTPUT_HEIGHT);
        assert_eq!(config.kernel_source, RAYTRACE_KERNEL_SOURCE);
    }

    #[test]
    fn accepts_degenerate_sizes_for_clamping() {
        let args = Args::parse_from(["sphere_raytracer", "--width", "-4", "--height", "0", "--kernel", "other"]);
        let config = PipelineConfig::from(&args);
        assert_eq!((config.output_width, config.output_height), (-4, 0));
        assert_eq!(config.kernel_entry_point, "other");
    }
}
