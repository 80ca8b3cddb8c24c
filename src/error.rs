use thiserror::Error;

/// Rejected configuration. Raised before any value reaches the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("spring must be positive and finite, got {0}")]
  Spring(f32),

  #[error("friction must lie strictly between 0 and 1, got {0}")]
  Friction(f32),

  #[error("pointer strength must be non-negative and finite, got {0}")]
  PointerStrength(f32),

  #[error("formation mix must be finite, got {0}")]
  FormationMix(f32),

  #[error("particle pool must hold at least one particle")]
  EmptyPool,

  #[error("viewport must have finite positive extent, got {width}x{height}")]
  InvalidViewport { width: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
  /// The sampled curve collapsed onto a vertical line, so it cannot be scaled.
  #[error("formation curve has a zero-width bounding box ({samples} samples)")]
  DegenerateBounds { samples: usize },
}

#[derive(Debug, Error)]
pub enum GpuError {
  #[error("failed to create render surface: {0}")]
  SurfaceCreation(#[from] wgpu::CreateSurfaceError),

  #[error("no compatible GPU adapter found")]
  NoAdapter,

  #[error("failed to create GPU device: {0}")]
  DeviceCreation(#[from] wgpu::RequestDeviceError),

  #[error("surface does not support the selected adapter")]
  UnsupportedSurface,
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Gpu(#[from] GpuError),

  #[error("event loop failure: {0}")]
  EventLoop(#[from] winit::error::EventLoopError),

  #[error("failed to open window: {0}")]
  Window(#[from] winit::error::OsError),

  #[error("failed to install interrupt handler: {0}")]
  Interrupt(#[from] ctrlc::Error),
}

/// Failure of a mutating simulation call that touches both config and geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Geometry(#[from] GeometryError),
}
