use crate::geometry::{formation_targets, scatter_target};
use crate::{ConfigError, GeometryError, Particle, Viewport};
use rand::Rng;

/// Fixed-size pool of particles. Index `i` always maps to formation sample `i`.
#[derive(Debug, Clone)]
pub struct ParticleStore {
  particles: Vec<Particle>,
}

impl ParticleStore {
  /// Spawns `count` particles at rest on their own scatter targets.
  ///
  /// Formation targets start at the origin; call [`ParticleStore::rebuild_formation`]
  /// to place them.
  pub fn create_pool<R: Rng + ?Sized>(
    count: usize,
    viewport: Viewport,
    rng: &mut R,
  ) -> Result<Self, ConfigError> {
    if count == 0 {
      return Err(ConfigError::EmptyPool);
    }
    let particles = (0..count)
      .map(|_| {
        let home = scatter_target(rng, viewport);
        Particle {
          pos: home,
          vel: [0.0; 2],
          scatter_target: home,
          formation_target: [0.0; 2],
        }
      })
      .collect();
    Ok(Self { particles })
  }

  pub fn len(&self) -> usize {
    self.particles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.particles.is_empty()
  }

  pub fn particles(&self) -> &[Particle] {
    &self.particles
  }

  pub fn particles_mut(&mut self) -> &mut [Particle] {
    &mut self.particles
  }

  pub fn for_each_mut<F: FnMut(usize, &mut Particle)>(&mut self, mut f: F) {
    for (i, particle) in self.particles.iter_mut().enumerate() {
      f(i, particle);
    }
  }

  /// Draws fresh scatter targets. Positions and velocities are left alone so
  /// particles drift over under the spring force.
  pub fn rescatter<R: Rng + ?Sized>(&mut self, viewport: Viewport, rng: &mut R) {
    for particle in &mut self.particles {
      particle.scatter_target = scatter_target(rng, viewport);
    }
  }

  /// Recomputes formation targets for `viewport`. On error the previous
  /// targets stay in place.
  pub fn rebuild_formation(&mut self, viewport: Viewport) -> Result<(), GeometryError> {
    let targets = formation_targets(self.particles.len(), viewport)?;
    for (particle, target) in self.particles.iter_mut().zip(targets) {
      particle.formation_target = target;
    }
    Ok(())
  }
}
