//! Per-particle, per-tick update: damped spring toward a blended target,
//! pointer pull, integration, then edge wrap.
//!
//! Steps are not scaled by frame time; one call is one tick.

use crate::{
  ParameterSet, Particle, PointerState, Viewport, POINTER_EPSILON, POINTER_RADIUS, WRAP_MARGIN,
};
use cgmath::{InnerSpace, Vector2, Zero};

/// Linear blend between the scatter and formation targets. `mix` is not clamped.
pub fn blended_target(particle: &Particle, mix: f32) -> Vector2<f32> {
  let scatter = Vector2::from(particle.scatter_target);
  let formation = Vector2::from(particle.formation_target);
  scatter + (formation - scatter) * mix
}

/// Velocity added by the pointer at `position`, pointing toward the pointer.
///
/// Falls off linearly from `strength` at the pointer to zero at
/// [`POINTER_RADIUS`]. Zero when the pointer is inactive.
pub fn pointer_pull(position: Vector2<f32>, pointer: &PointerState, strength: f32) -> Vector2<f32> {
  if !pointer.active {
    return Vector2::zero();
  }
  let delta = Vector2::from(pointer.position) - position;
  let dist2 = delta.magnitude2();
  if dist2 >= POINTER_RADIUS * POINTER_RADIUS {
    return Vector2::zero();
  }
  let dist = dist2.sqrt() + POINTER_EPSILON;
  let falloff = (1.0 - dist / POINTER_RADIUS) * strength;
  delta / dist * falloff
}

/// Teleports a coordinate that left `[-margin, extent + margin]` to the opposite edge.
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
  if value < -WRAP_MARGIN {
    extent + WRAP_MARGIN
  } else if value > extent + WRAP_MARGIN {
    -WRAP_MARGIN
  } else {
    value
  }
}

pub fn wrap_position(position: Vector2<f32>, viewport: Viewport) -> Vector2<f32> {
  Vector2::new(
    wrap_coordinate(position.x, viewport.width),
    wrap_coordinate(position.y, viewport.height),
  )
}

pub fn step_particle(
  particle: &mut Particle,
  params: &ParameterSet,
  pointer: &PointerState,
  viewport: Viewport,
) {
  let position = Vector2::from(particle.pos);
  let target = blended_target(particle, params.formation_mix);
  let accel = (target - position) * params.spring;

  // friction damps the spring velocity only; the pointer pull is added undamped
  let mut velocity = (Vector2::from(particle.vel) + accel) * params.friction;
  velocity += pointer_pull(position, pointer, params.pointer_strength);

  particle.vel = velocity.into();
  particle.pos = wrap_position(position + velocity, viewport).into();
}

#[cfg(test)]
mod tests {
  use super::*;

  fn particle_at(pos: [f32; 2], scatter: [f32; 2], formation: [f32; 2]) -> Particle {
    Particle {
      pos,
      vel: [0.0; 2],
      scatter_target: scatter,
      formation_target: formation,
    }
  }

  #[test]
  fn blend_is_exact_at_the_ends() {
    let p = particle_at([0.0; 2], [3.5, 7.25], [91.0, 12.125]);
    assert_eq!(blended_target(&p, 0.0), Vector2::new(3.5, 7.25));
    assert_eq!(blended_target(&p, 1.0), Vector2::new(91.0, 12.125));
  }

  #[test]
  fn blend_extrapolates_past_one() {
    let p = particle_at([0.0; 2], [0.0, 0.0], [100.0, 50.0]);
    let t = blended_target(&p, 1.08);
    assert!((t.x - 108.0).abs() < 1e-4);
    assert!((t.y - 54.0).abs() < 1e-4);
  }

  #[test]
  fn single_tick_toward_formation() {
    let viewport = Viewport::new(100.0, 100.0).unwrap();
    let params = ParameterSet {
      formation_mix: 1.0,
      spring: 0.02,
      friction: 0.86,
      ..ParameterSet::default()
    };
    let mut p = particle_at([0.0, 0.0], [80.0, 20.0], [50.0, 50.0]);
    step_particle(&mut p, &params, &PointerState::default(), viewport);
    assert!((p.vel[0] - 0.86).abs() < 1e-6);
    assert!((p.vel[1] - 0.86).abs() < 1e-6);
    assert!((p.pos[0] - 0.86).abs() < 1e-6);
    assert!((p.pos[1] - 0.86).abs() < 1e-6);
  }

  #[test]
  fn friction_applies_to_old_velocity_plus_acceleration() {
    let viewport = Viewport::new(100.0, 100.0).unwrap();
    let params = ParameterSet {
      spring: 0.5,
      friction: 0.5,
      ..ParameterSet::default()
    };
    let mut p = particle_at([10.0, 10.0], [20.0, 10.0], [0.0; 2]);
    p.vel = [2.0, 0.0];
    step_particle(&mut p, &params, &PointerState::default(), viewport);
    // (2 + (20 - 10) * 0.5) * 0.5
    assert_eq!(p.vel, [3.5, 0.0]);
    assert_eq!(p.pos, [13.5, 10.0]);
  }

  #[test]
  fn pointer_pull_vanishes_at_and_beyond_radius() {
    let pointer = PointerState {
      position: [0.0, 0.0],
      active: true,
    };
    for dist in [160.0, 160.5, 400.0] {
      assert_eq!(pointer_pull(Vector2::new(dist, 0.0), &pointer, 0.8), Vector2::zero());
    }
  }

  #[test]
  fn pointer_pull_attracts_inside_radius() {
    let pointer = PointerState {
      position: [50.0, 50.0],
      active: true,
    };
    for dist in [0.5f32, 10.0, 80.0, 159.0] {
      let from = Vector2::new(50.0 - dist, 50.0);
      let pull = pointer_pull(from, &pointer, 0.8);
      assert!(pull.x > 0.0, "pull toward pointer at distance {dist}");
      assert!(pull.y.abs() < 1e-6);
      let reach = dist + POINTER_EPSILON;
      let expected = dist / reach * (1.0 - reach / POINTER_RADIUS) * 0.8;
      assert!((pull.magnitude() - expected).abs() < 1e-4);
    }
  }

  #[test]
  fn pointer_pull_is_finite_on_top_of_pointer() {
    let pointer = PointerState {
      position: [5.0, 5.0],
      active: true,
    };
    let pull = pointer_pull(Vector2::new(5.0, 5.0), &pointer, 0.8);
    assert_eq!(pull, Vector2::zero());
  }

  #[test]
  fn inactive_pointer_does_nothing() {
    let pointer = PointerState {
      position: [5.0, 5.0],
      active: false,
    };
    assert_eq!(pointer_pull(Vector2::new(6.0, 5.0), &pointer, 0.8), Vector2::zero());
  }

  #[test]
  fn pointer_pull_is_not_damped_by_friction() {
    let viewport = Viewport::new(400.0, 400.0).unwrap();
    let params = ParameterSet::default();
    let pointer = PointerState {
      position: [200.0, 100.0],
      active: true,
    };
    // at rest on its target, so the spring contributes nothing
    let mut p = particle_at([100.0, 100.0], [100.0, 100.0], [0.0; 2]);
    step_particle(&mut p, &params, &pointer, viewport);
    let expected = (1.0 - (100.0 + POINTER_EPSILON) / POINTER_RADIUS) * params.pointer_strength;
    assert!((p.vel[0] - expected).abs() < 1e-5);
  }

  #[test]
  fn wrap_teleports_without_touching_velocity() {
    let viewport = Viewport::new(100.0, 80.0).unwrap();
    let params = ParameterSet::default();
    // resting on its scatter target, so only friction acts on the velocity
    let mut p = particle_at([-9.0, 85.0], [-9.0, 85.0], [0.0; 2]);
    p.vel = [-5.0, 10.0];
    let before = p.vel;
    let friction_only = [before[0] * params.friction, before[1] * params.friction];
    step_particle(&mut p, &params, &PointerState::default(), viewport);
    assert_eq!(p.pos, [110.0, -10.0]);
    assert!((p.vel[0] - friction_only[0]).abs() < 1e-5);
    assert!((p.vel[1] - friction_only[1]).abs() < 1e-5);
  }

  #[test]
  fn wrap_keeps_margin_band() {
    assert_eq!(wrap_coordinate(-10.0, 50.0), -10.0);
    assert_eq!(wrap_coordinate(-10.5, 50.0), 60.0);
    assert_eq!(wrap_coordinate(60.0, 50.0), 60.0);
    assert_eq!(wrap_coordinate(60.5, 50.0), -10.0);
  }
}
