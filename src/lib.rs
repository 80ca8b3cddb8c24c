pub mod error;
pub mod force;
pub mod geometry;
pub mod params;
pub mod particles;
pub mod pointer;
pub mod render;
pub mod simulation;
pub mod state;
pub mod tween;

pub use error::{AppError, ConfigError, GeometryError, GpuError, SimError};
pub use params::{ParamField, ParameterPatch, ParameterSet};
pub use particles::ParticleStore;
pub use pointer::PointerState;
pub use simulation::{Disk, DiskSink, FrameStats, Simulation, StopHandle};

/// Fixed size of the particle pool.
pub const POOL_SIZE: usize = 1500;
/// Radius (logical pixels) inside which the pointer pulls on particles.
pub const POINTER_RADIUS: f32 = 160.0;
/// Floor added to the pointer distance before dividing by it.
pub const POINTER_EPSILON: f32 = 0.0001;
/// Distance past each viewport edge at which particles teleport to the other side.
pub const WRAP_MARGIN: f32 = 10.0;
pub const DISK_RADIUS: f32 = 1.6;
/// Translucent white, `rgba(255, 255, 255, 0.9)`.
pub const DISK_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.9];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
  pub width: f32,
  pub height: f32,
}

impl Viewport {
  pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(width) || !valid(height) {
      return Err(ConfigError::InvalidViewport { width, height });
    }
    Ok(Self { width, height })
  }
}

#[derive(Clone, Debug)]
pub struct SimConfig {
  pub particle_count: usize,
  pub viewport: Viewport,
  pub params: ParameterSet,
  /// Seed for scatter sampling; `None` draws from OS entropy.
  pub seed: Option<u64>,
}

impl Default for SimConfig {
  fn default() -> Self {
    Self {
      particle_count: POOL_SIZE,
      viewport: Viewport {
        width: 960.0,
        height: 540.0,
      },
      params: ParameterSet::default(),
      seed: None,
    }
  }
}

/// One particle of the pool. Laid out so the pool can be uploaded as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
  pub pos: [f32; 2],
  pub vel: [f32; 2],
  pub scatter_target: [f32; 2],
  pub formation_target: [f32; 2],
}
