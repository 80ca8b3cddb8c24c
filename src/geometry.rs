use crate::{GeometryError, Viewport};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::f32::consts::TAU;

/// Share of the viewport width the formation spans.
const FORMATION_WIDTH_FRACTION: f32 = 0.35;
/// Formation centre as a fraction of the viewport, sitting slightly above the middle.
const FORMATION_CENTER: (f32, f32) = (0.5, 0.45);

/// Classic parametric heart. `y` grows upward.
pub fn heart_point(t: f32) -> (f32, f32) {
  let x = 16.0 * t.sin().powi(3);
  let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
  (x, y)
}

/// Samples `count` points along the heart and maps them into canvas space.
///
/// Sample `i` sits at `t = i / count * 2π`, so the output is index-aligned with
/// the particle pool. The result only depends on `count` and `viewport`.
pub fn formation_targets(
  count: usize,
  viewport: Viewport,
) -> Result<Vec<[f32; 2]>, GeometryError> {
  let samples: Vec<(f32, f32)> = (0..count)
    .map(|i| heart_point(i as f32 / count as f32 * TAU))
    .collect();

  let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
  let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
  for &(x, y) in &samples {
    min_x = min_x.min(x);
    max_x = max_x.max(x);
    min_y = min_y.min(y);
    max_y = max_y.max(y);
  }

  let bounds_width = max_x - min_x;
  let bounds_height = max_y - min_y;
  if !(bounds_width > f32::EPSILON) {
    return Err(GeometryError::DegenerateBounds { samples: count });
  }

  let scale = viewport.width * FORMATION_WIDTH_FRACTION / bounds_width;
  let mid_x = min_x + bounds_width / 2.0;
  let mid_y = min_y + bounds_height / 2.0;
  let cx = viewport.width * FORMATION_CENTER.0;
  let cy = viewport.height * FORMATION_CENTER.1;

  Ok(
    samples
      .into_iter()
      // canvas y grows downward
      .map(|(x, y)| [(x - mid_x) * scale + cx, -(y - mid_y) * scale + cy])
      .collect(),
  )
}

/// Uniform sample inside `[0, width] x [0, height]`.
pub fn scatter_target<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> [f32; 2] {
  let xs = Uniform::new_inclusive(0.0, viewport.width);
  let ys = Uniform::new_inclusive(0.0, viewport.height);
  [xs.sample(rng), ys.sample(rng)]
}
