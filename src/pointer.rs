/// Last known pointer position in logical pixels, and whether it is over the viewport.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerState {
  pub position: [f32; 2],
  pub active: bool,
}

impl PointerState {
  pub fn set(&mut self, x: f32, y: f32) {
    self.position = [x, y];
    self.active = true;
  }

  /// Deactivates the pointer. The last position is kept.
  pub fn clear(&mut self) {
    self.active = false;
  }
}
