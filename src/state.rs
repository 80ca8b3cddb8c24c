use crate::render::DiskRenderer;
use crate::{AppError, Disk, DiskSink, FrameStats, GpuError, SimConfig, Simulation, Viewport};
use std::sync::Arc;
use std::time::Instant;
use winit::{
  dpi::{LogicalSize, PhysicalSize},
  event::{ElementState, Event, KeyEvent, StartCause, WindowEvent},
  event_loop::{EventLoop, EventLoopWindowTarget},
  keyboard::{KeyCode, PhysicalKey},
  window::{Window, WindowBuilder},
};

/// Longest wall-clock step fed to the parameter transitions, e.g. after the
/// window was hidden for a while.
const MAX_FRAME_DT: f32 = 0.25;
/// Frame time used when there is no display to pace the loop.
const HEADLESS_DT: f32 = 1.0 / 60.0;
const HEADLESS_LOG_EVERY: u64 = 60;

struct EventLoopWrapper {
  event_loop: EventLoop<()>,
  window: Arc<Window>,
}

impl EventLoopWrapper {
  pub fn new(title: &str, viewport: Viewport) -> Result<Self, AppError> {
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
      .with_title(title)
      .with_inner_size(LogicalSize::new(viewport.width, viewport.height))
      .build(&event_loop)?;

    Ok(Self {
      event_loop,
      window: Arc::new(window),
    })
  }
}

struct GpuContext {
  surface: wgpu::Surface<'static>,
  config: wgpu::SurfaceConfiguration,
  device: wgpu::Device,
  queue: wgpu::Queue,
}

impl GpuContext {
  async fn init(window: Arc<Window>) -> Result<Self, GpuError> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
      #[cfg(not(target_arch = "wasm32"))]
      backends: wgpu::Backends::PRIMARY,
      ..Default::default()
    });
    let size = window.inner_size();
    let surface = instance.create_surface(window)?;

    let adapter = instance
      .request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
      })
      .await
      .ok_or(GpuError::NoAdapter)?;
    log::info!("using adapter {}", adapter.get_info().name);

    let (device, queue) = adapter
      .request_device(
        &wgpu::DeviceDescriptor {
          label: None,
          required_features: wgpu::Features::empty(),
          required_limits: wgpu::Limits::downlevel_defaults(),
          memory_hints: Default::default(),
        },
        None,
      )
      .await?;

    let mut config = surface
      .get_default_config(&adapter, size.width.max(1), size.height.max(1))
      .ok_or(GpuError::UnsupportedSurface)?;
    let view_format = config.format.add_srgb_suffix();
    config.view_formats.push(view_format);
    surface.configure(&device, &config);

    Ok(Self {
      surface,
      config,
      device,
      queue,
    })
  }

  fn resize(&mut self, size: PhysicalSize<u32>) {
    if size.width == 0 || size.height == 0 {
      return;
    }
    self.config.width = size.width;
    self.config.height = size.height;
    self.surface.configure(&self.device, &self.config);
  }

  fn acquire(&mut self) -> Option<wgpu::SurfaceTexture> {
    match self.surface.get_current_texture() {
      Ok(frame) => Some(frame),
      Err(wgpu::SurfaceError::Timeout) => None,
      Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
        self.surface.configure(&self.device, &self.config);
        None
      }
      Err(err) => {
        log::error!("dropping frame: {err}");
        None
      }
    }
  }

  fn view_format(&self) -> wgpu::TextureFormat {
    self.config.view_formats.first().copied().unwrap_or(self.config.format)
  }
}

/// Feeds the window's logical size (CSS-pixel equivalent) to the simulation.
fn sync_viewport(sim: &mut Simulation, size: PhysicalSize<u32>, scale_factor: f64) {
  let logical = size.to_logical::<f32>(scale_factor);
  if let Err(err) = sim.resize(logical.width, logical.height) {
    log::warn!(
      "resize to {}x{} not fully applied: {err}",
      logical.width,
      logical.height
    );
  }
}

async fn start(config: SimConfig, heart_on_start: bool) -> Result<(), AppError> {
  let mut sim = Simulation::new(&config)?;
  let EventLoopWrapper { event_loop, window } = EventLoopWrapper::new("Heart Swarm", config.viewport)?;
  let mut gpu = GpuContext::init(window.clone()).await?;
  let mut renderer = DiskRenderer::init(&gpu.config, &gpu.device, sim.particles().len());

  let mut scale_factor = window.scale_factor();
  sync_viewport(&mut sim, window.inner_size(), scale_factor);
  if heart_on_start {
    sim.play_heart();
  }

  let stop = sim.stop_handle();
  let mut last_frame = Instant::now();

  event_loop.run(move |event, target: &EventLoopWindowTarget<()>| {
    if stop.is_stopped() {
      target.exit();
      return;
    }
    match event {
      Event::NewEvents(StartCause::Init) => window.request_redraw(),
      Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
        WindowEvent::CloseRequested => {
          stop.stop();
          target.exit();
        }
        WindowEvent::KeyboardInput {
          event:
            KeyEvent {
              state: ElementState::Pressed,
              physical_key: PhysicalKey::Code(keycode),
              repeat: false,
              ..
            },
          ..
        } => match keycode {
          KeyCode::Escape => {
            stop.stop();
            target.exit();
          }
          KeyCode::KeyH => sim.play_heart(),
          KeyCode::KeyS => sim.play_scatter(),
          KeyCode::KeyR => {
            if let Err(err) = sim.rebuild_formation() {
              log::warn!("{err}");
            }
          }
          _ => {}
        },
        WindowEvent::Resized(size) => {
          gpu.resize(size);
          sync_viewport(&mut sim, size, scale_factor);
        }
        WindowEvent::ScaleFactorChanged {
          scale_factor: factor,
          ..
        } => {
          scale_factor = factor;
          // no Resized follows when the physical size stays the same
          sync_viewport(&mut sim, window.inner_size(), scale_factor);
        }
        WindowEvent::CursorMoved { position, .. } => {
          let position = position.to_logical::<f32>(scale_factor);
          sim.pointer_move(position.x, position.y);
        }
        WindowEvent::CursorLeft { .. } => sim.pointer_leave(),
        WindowEvent::RedrawRequested => {
          let now = Instant::now();
          let dt = now.duration_since(last_frame).as_secs_f32().min(MAX_FRAME_DT);
          last_frame = now;

          if let Some(frame) = gpu.acquire() {
            let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
              format: Some(gpu.view_format()),
              ..wgpu::TextureViewDescriptor::default()
            });
            sim.frame(dt, &mut renderer);
            renderer.present(&view, &gpu.device, &gpu.queue);
            frame.present();
          }
          window.request_redraw();
        }
        _ => {}
      },
      _ => {}
    }
  })?;

  log::info!("window closed");
  Ok(())
}

/// Opens a window and runs the swarm until it is closed.
pub fn run(config: SimConfig, heart_on_start: bool) -> Result<(), AppError> {
  pollster::block_on(start(config, heart_on_start))
}

/// Sink that only tracks how many disks were drawn and where.
#[derive(Debug, Default)]
pub struct Tally {
  pub disks: usize,
  pub min: [f32; 2],
  pub max: [f32; 2],
}

impl DiskSink for Tally {
  fn clear(&mut self, _viewport: Viewport) {
    *self = Self {
      disks: 0,
      min: [f32::INFINITY; 2],
      max: [f32::NEG_INFINITY; 2],
    };
  }

  fn draw_disk(&mut self, disk: Disk) {
    self.disks += 1;
    for axis in 0..2 {
      self.min[axis] = self.min[axis].min(disk.center[axis]);
      self.max[axis] = self.max[axis].max(disk.center[axis]);
    }
  }
}

/// Runs `frames` fixed-step frames (or until stopped) without a display.
pub fn drive_headless(sim: &mut Simulation, frames: Option<u64>, sink: &mut Tally) -> Option<FrameStats> {
  let mut last = None;
  while frames.map_or(true, |limit| sim.ticks() < limit) && !sim.is_stopped() {
    let stats = sim.frame(HEADLESS_DT, sink);
    if stats.tick % HEADLESS_LOG_EVERY == 0 {
      log::info!(
        "tick {} mix={:.3} mean distance to target={:.2} extent=({:.0},{:.0})..({:.0},{:.0})",
        stats.tick,
        stats.formation_mix,
        sim.mean_target_distance(),
        sink.min[0],
        sink.min[1],
        sink.max[0],
        sink.max[1]
      );
    }
    last = Some(stats);
  }
  last
}

/// Headless entry point. Ctrl-C trips the simulation's stop handle.
pub fn run_headless(
  config: SimConfig,
  frames: Option<u64>,
  heart_on_start: bool,
) -> Result<Option<FrameStats>, AppError> {
  let mut sim = Simulation::new(&config)?;
  let stop = sim.stop_handle();
  ctrlc::set_handler(move || stop.stop())?;

  if heart_on_start {
    sim.play_heart();
  }
  let stats = drive_headless(&mut sim, frames, &mut Tally::default());
  if let Some(stats) = &stats {
    log::info!(
      "stopped after {} ticks, mean distance to target {:.2}",
      stats.tick,
      sim.mean_target_distance()
    );
  }
  Ok(stats)
}
