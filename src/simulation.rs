use crate::force::{blended_target, step_particle};
use crate::tween::{heart_sequence, scatter_sequence, Tweener};
use crate::{
  ConfigError, GeometryError, ParameterPatch, ParameterSet, Particle, ParticleStore, PointerState,
  SimConfig, SimError, Viewport, DISK_COLOR, DISK_RADIUS,
};
use cgmath::{InnerSpace, Vector2};
use rand::{rngs::SmallRng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Disk {
  pub center: [f32; 2],
  pub radius: f32,
  pub color: [f32; 4],
}

/// Drawing surface the simulation renders into once per frame.
pub trait DiskSink {
  /// Starts a new frame covering `viewport`.
  fn clear(&mut self, viewport: Viewport);
  fn draw_disk(&mut self, disk: Disk);
}

/// Cloneable flag used to tear the frame loop down from outside it.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn stop(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_stopped(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameStats {
  pub tick: u64,
  pub drawn: usize,
  pub formation_mix: f32,
}

/// Owns the particle pool and everything the force model reads each tick.
///
/// Host code feeds it resize, pointer and trigger events between frames and
/// calls [`Simulation::frame`] once per display refresh.
pub struct Simulation {
  store: ParticleStore,
  params: ParameterSet,
  pointer: PointerState,
  viewport: Viewport,
  tweener: Tweener,
  rng: SmallRng,
  stop: StopHandle,
  ticks: u64,
}

impl Simulation {
  pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
    config.params.validate()?;
    let viewport = Viewport::new(config.viewport.width, config.viewport.height)?;
    let mut rng = match config.seed {
      Some(seed) => SmallRng::seed_from_u64(seed),
      None => SmallRng::from_entropy(),
    };
    let mut store = ParticleStore::create_pool(config.particle_count, viewport, &mut rng)?;
    if let Err(err) = store.rebuild_formation(viewport) {
      log::warn!("formation targets left at origin: {err}");
    }
    log::info!(
      "spawned {} particles in a {}x{} viewport",
      store.len(),
      viewport.width,
      viewport.height
    );

    Ok(Self {
      store,
      params: config.params,
      pointer: PointerState::default(),
      viewport,
      tweener: Tweener::new(),
      rng,
      stop: StopHandle::new(),
      ticks: 0,
    })
  }

  pub fn particles(&self) -> &[Particle] {
    self.store.particles()
  }

  pub fn particles_mut(&mut self) -> &mut [Particle] {
    self.store.particles_mut()
  }

  pub fn params(&self) -> &ParameterSet {
    &self.params
  }

  pub fn pointer(&self) -> &PointerState {
    &self.pointer
  }

  pub fn viewport(&self) -> Viewport {
    self.viewport
  }

  pub fn ticks(&self) -> u64 {
    self.ticks
  }

  pub fn stop_handle(&self) -> StopHandle {
    self.stop.clone()
  }

  pub fn is_stopped(&self) -> bool {
    self.stop.is_stopped()
  }

  /// Replaces the viewport and rebuilds the formation for it.
  ///
  /// An invalid size leaves everything untouched. A degenerate formation keeps
  /// the new viewport but the previous formation targets.
  pub fn resize(&mut self, width: f32, height: f32) -> Result<(), SimError> {
    self.viewport = Viewport::new(width, height)?;
    self.rebuild_formation()?;
    Ok(())
  }

  pub fn rebuild_formation(&mut self) -> Result<(), GeometryError> {
    self.store.rebuild_formation(self.viewport)?;
    log::debug!(
      "rebuilt formation for {}x{}",
      self.viewport.width,
      self.viewport.height
    );
    Ok(())
  }

  pub fn pointer_move(&mut self, x: f32, y: f32) {
    self.pointer.set(x, y);
  }

  pub fn pointer_leave(&mut self) {
    self.pointer.clear();
  }

  /// Draws new scatter targets; particles drift toward them over the next ticks.
  pub fn trigger_scatter(&mut self) {
    self.store.rescatter(self.viewport, &mut self.rng);
  }

  /// Applied immediately; smooth transitions go through the tweener instead.
  pub fn set_parameters(&mut self, patch: ParameterPatch) -> Result<(), ConfigError> {
    self.params.apply(patch)
  }

  /// Rescatters, then pulls the swarm into the formation with an overshoot.
  pub fn play_heart(&mut self) {
    log::debug!("heart transition");
    self.trigger_scatter();
    self.tweener.play(&heart_sequence());
  }

  /// Rescatters and eases the formation mix back to zero.
  pub fn play_scatter(&mut self) {
    log::debug!("scatter transition");
    self.trigger_scatter();
    self.tweener.play(&scatter_sequence());
  }

  /// Moves scheduled parameter transitions forward by `dt` seconds.
  pub fn advance(&mut self, dt: f32) {
    self.tweener.advance(dt, &mut self.params);
  }

  /// Runs the force model once over the whole pool.
  pub fn tick(&mut self) {
    // every particle sees the same inputs for the whole tick
    let params = self.params;
    let pointer = self.pointer;
    let viewport = self.viewport;
    self
      .store
      .for_each_mut(|_, particle| step_particle(particle, &params, &pointer, viewport));
    self.ticks += 1;
  }

  pub fn render<S: DiskSink + ?Sized>(&self, sink: &mut S) -> usize {
    sink.clear(self.viewport);
    for particle in self.store.particles() {
      sink.draw_disk(Disk {
        center: particle.pos,
        radius: DISK_RADIUS,
        color: DISK_COLOR,
      });
    }
    self.store.len()
  }

  /// One display frame: advance transitions, tick physics, render.
  pub fn frame<S: DiskSink + ?Sized>(&mut self, dt: f32, sink: &mut S) -> FrameStats {
    self.advance(dt);
    self.tick();
    let drawn = self.render(sink);
    FrameStats {
      tick: self.ticks,
      drawn,
      formation_mix: self.params.formation_mix,
    }
  }

  /// Average distance from each particle to its current blended target.
  /// A full pass over the pool, so callers sample it rather than run it per frame.
  pub fn mean_target_distance(&self) -> f32 {
    let particles = self.store.particles();
    let total: f32 = particles
      .iter()
      .map(|p| (blended_target(p, self.params.formation_mix) - Vector2::from(p.pos)).magnitude())
      .sum();
    total / particles.len() as f32
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct Recorder {
    cleared: Vec<Viewport>,
    disks: Vec<Disk>,
  }

  impl DiskSink for Recorder {
    fn clear(&mut self, viewport: Viewport) {
      self.cleared.push(viewport);
      self.disks.clear();
    }

    fn draw_disk(&mut self, disk: Disk) {
      self.disks.push(disk);
    }
  }

  fn config(count: usize) -> SimConfig {
    SimConfig {
      particle_count: count,
      viewport: Viewport {
        width: 800.0,
        height: 600.0,
      },
      seed: Some(11),
      ..SimConfig::default()
    }
  }

  #[test]
  fn rejects_invalid_config() {
    let mut bad = config(10);
    bad.params.friction = 1.2;
    assert_eq!(Simulation::new(&bad).err(), Some(ConfigError::Friction(1.2)));

    let mut bad = config(10);
    bad.params.spring = -0.1;
    assert_eq!(Simulation::new(&bad).err(), Some(ConfigError::Spring(-0.1)));

    assert_eq!(Simulation::new(&config(0)).err(), Some(ConfigError::EmptyPool));

    let mut bad = config(10);
    bad.viewport.width = f32::NAN;
    assert!(matches!(
      Simulation::new(&bad).err(),
      Some(ConfigError::InvalidViewport { .. })
    ));
  }

  #[test]
  fn frame_renders_every_particle_at_post_tick_position() {
    let mut sim = Simulation::new(&config(50)).unwrap();
    sim.set_parameters(ParameterPatch {
      formation_mix: Some(1.0),
      ..Default::default()
    })
    .unwrap();
    let mut sink = Recorder::default();

    let stats = sim.frame(1.0 / 60.0, &mut sink);

    assert_eq!(stats.tick, 1);
    assert_eq!(stats.drawn, 50);
    assert_eq!(sink.cleared, vec![sim.viewport()]);
    assert_eq!(sink.disks.len(), 50);
    for (disk, particle) in sink.disks.iter().zip(sim.particles()) {
      assert_eq!(disk.center, particle.pos);
      assert_eq!(disk.radius, DISK_RADIUS);
      assert_eq!(disk.color, DISK_COLOR);
    }
  }

  #[test]
  fn invalid_resize_changes_nothing() {
    let mut sim = Simulation::new(&config(20)).unwrap();
    let before = sim.particles().to_vec();
    assert!(matches!(sim.resize(0.0, 100.0), Err(SimError::Config(_))));
    assert_eq!(sim.viewport(), config(20).viewport);
    assert_eq!(sim.particles(), &before[..]);
  }

  #[test]
  fn degenerate_resize_keeps_targets_but_takes_viewport() {
    let mut sim = Simulation::new(&config(2)).unwrap();
    sim.particles_mut()[0].formation_target = [3.0, 4.0];
    assert!(matches!(sim.resize(400.0, 300.0), Err(SimError::Geometry(_))));
    assert_eq!(sim.viewport(), Viewport::new(400.0, 300.0).unwrap());
    assert_eq!(sim.particles()[0].formation_target, [3.0, 4.0]);
  }

  #[test]
  fn pointer_events_flow_through() {
    let mut sim = Simulation::new(&config(5)).unwrap();
    sim.pointer_move(10.0, 20.0);
    assert_eq!(
      *sim.pointer(),
      PointerState {
        position: [10.0, 20.0],
        active: true
      }
    );
    sim.pointer_leave();
    assert!(!sim.pointer().active);
  }

  #[test]
  fn stop_handle_is_shared() {
    let sim = Simulation::new(&config(5)).unwrap();
    let handle = sim.stop_handle();
    assert!(!sim.is_stopped());
    handle.stop();
    assert!(sim.is_stopped());
  }

  #[test]
  fn play_heart_drives_mix_to_formation() {
    let mut sim = Simulation::new(&config(100)).unwrap();
    let mut sink = Recorder::default();
    for _ in 0..180 {
      sim.frame(1.0 / 60.0, &mut sink);
    }
    sim.play_heart();
    for _ in 0..180 {
      sim.frame(1.0 / 60.0, &mut sink);
    }
    assert_eq!(sim.params().formation_mix, 1.0);
    assert_eq!(sim.params().spring, ParameterSet::default().spring);

    sim.play_scatter();
    for _ in 0..90 {
      sim.frame(1.0 / 60.0, &mut sink);
    }
    assert_eq!(sim.params().formation_mix, 0.0);
  }
}
