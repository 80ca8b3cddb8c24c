//! Value-over-time scheduling for the parameter set.
//!
//! A [`Tweener`] keeps a clock and a list of [`Tween`]s. Each tween captures its
//! start value from the live parameters the first time it becomes active, so
//! chained tweens pick up wherever the previous one left the field. Active
//! tweens are applied in start order; a later-starting tween wins on a shared
//! field.

use crate::{ParamField, ParameterSet};
use std::f32::consts::TAU;

/// Easing curves, named after their GSAP counterparts.
///
/// `PowerOut(n)` / `PowerInOut(n)` follow GSAP's `powerN`, which is a
/// polynomial of degree `n + 1`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Ease {
  Linear,
  PowerOut(u8),
  PowerInOut(u8),
  ElasticOut { amplitude: f32, period: f32 },
}

impl Ease {
  pub fn apply(self, p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    match self {
      Ease::Linear => p,
      Ease::PowerOut(n) => power_out(n, p),
      Ease::PowerInOut(n) => {
        if p < 0.5 {
          (1.0 - power_out(n, 1.0 - 2.0 * p)) / 2.0
        } else {
          0.5 + power_out(n, 2.0 * p - 1.0) / 2.0
        }
      }
      Ease::ElasticOut { amplitude, period } => {
        if p >= 1.0 {
          return 1.0;
        }
        let amplitude = amplitude.max(1.0);
        let shift = period / TAU * (1.0 / amplitude).asin();
        amplitude * 2f32.powf(-10.0 * p) * ((p - shift) * TAU / period).sin() + 1.0
      }
    }
  }
}

fn power_out(n: u8, p: f32) -> f32 {
  1.0 - (1.0 - p).powi(i32::from(n) + 1)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tween {
  pub field: ParamField,
  pub to: f32,
  /// Offset in seconds from the moment the tween is scheduled.
  pub delay: f32,
  pub duration: f32,
  pub ease: Ease,
}

impl Tween {
  pub fn new(field: ParamField, to: f32, delay: f32, duration: f32, ease: Ease) -> Self {
    Self {
      field,
      to,
      delay,
      duration,
      ease,
    }
  }
}

#[derive(Copy, Clone, Debug)]
struct Active {
  tween: Tween,
  start: f32,
  from: Option<f32>,
}

#[derive(Debug, Default)]
pub struct Tweener {
  clock: f32,
  tweens: Vec<Active>,
}

impl Tweener {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.tweens.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tweens.is_empty()
  }

  /// Schedules `sequence` relative to now. Pending or running tweens on any
  /// field the sequence touches are dropped first.
  pub fn play(&mut self, sequence: &[Tween]) {
    self
      .tweens
      .retain(|active| !sequence.iter().any(|t| t.field == active.tween.field));
    // rebase on "now" so the f32 clock never grows past one sequence length
    let now = std::mem::take(&mut self.clock);
    for active in &mut self.tweens {
      active.start -= now;
    }
    for tween in sequence {
      self.tweens.push(Active {
        tween: *tween,
        start: tween.delay.max(0.0),
        from: None,
      });
    }
    self.tweens.sort_by(|a, b| a.start.total_cmp(&b.start));
  }

  /// Advances the clock by `dt` seconds and writes every active tween into `params`.
  pub fn advance(&mut self, dt: f32, params: &mut ParameterSet) {
    if self.tweens.is_empty() {
      self.clock = 0.0;
      return;
    }
    self.clock += dt.max(0.0);
    let now = self.clock;

    for active in self.tweens.iter_mut().filter(|a| a.start <= now) {
      let from = *active.from.get_or_insert_with(|| params.get(active.tween.field));
      let tween = active.tween;
      let progress = if tween.duration <= f32::EPSILON {
        1.0
      } else {
        ((now - active.start) / tween.duration).min(1.0)
      };
      let value = if progress >= 1.0 {
        tween.to
      } else {
        from + (tween.to - from) * tween.ease.apply(progress)
      };
      if let Err(err) = params.set(tween.field, value) {
        log::warn!("dropping tween write to {:?}: {err}", tween.field);
      }
    }

    self
      .tweens
      .retain(|a| a.start > now || now - a.start < a.tween.duration);
  }
}

/// Pulls the swarm into the heart: a quick energetic kick, the main pull,
/// a small overshoot that settles elastically, then the resting feel returns.
pub fn heart_sequence() -> Vec<Tween> {
  use ParamField::*;
  let rest = ParameterSet::default();
  vec![
    Tween::new(Spring, 0.035, 0.0, 0.25, Ease::PowerOut(2)),
    Tween::new(Friction, 0.82, 0.0, 0.25, Ease::PowerOut(2)),
    Tween::new(PointerStrength, 0.2, 0.0, 0.25, Ease::PowerOut(2)),
    Tween::new(FormationMix, 1.0, 0.05, 1.1, Ease::PowerInOut(4)),
    Tween::new(FormationMix, 1.08, 1.05, 0.25, Ease::PowerOut(2)),
    Tween::new(
      FormationMix,
      1.0,
      1.25,
      0.35,
      Ease::ElasticOut {
        amplitude: 1.0,
        period: 0.35,
      },
    ),
    Tween::new(Spring, rest.spring, 1.35, 0.5, Ease::PowerOut(2)),
    Tween::new(Friction, rest.friction, 1.35, 0.5, Ease::PowerOut(2)),
    Tween::new(PointerStrength, rest.pointer_strength, 1.35, 0.5, Ease::PowerOut(2)),
  ]
}

pub fn scatter_sequence() -> Vec<Tween> {
  vec![Tween::new(
    ParamField::FormationMix,
    0.0,
    0.0,
    1.0,
    Ease::PowerInOut(3),
  )]
}
