use crate::ConfigError;

/// Tunable scalars read by the force model every tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParameterSet {
  /// 0 seeks the scatter targets, 1 the formation. Never clamped, so values
  /// past either end overshoot.
  pub formation_mix: f32,
  pub spring: f32,
  pub friction: f32,
  /// Multiplier on the pointer pull.
  pub pointer_strength: f32,
}

impl Default for ParameterSet {
  fn default() -> Self {
    Self {
      formation_mix: 0.0,
      spring: 0.02,
      friction: 0.86,
      pointer_strength: 0.8,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamField {
  FormationMix,
  Spring,
  Friction,
  PointerStrength,
}

/// Partial update; `None` fields are left untouched.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ParameterPatch {
  pub formation_mix: Option<f32>,
  pub spring: Option<f32>,
  pub friction: Option<f32>,
  pub pointer_strength: Option<f32>,
}

impl ParameterSet {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !(self.spring.is_finite() && self.spring > 0.0) {
      return Err(ConfigError::Spring(self.spring));
    }
    if !(self.friction > 0.0 && self.friction < 1.0) {
      return Err(ConfigError::Friction(self.friction));
    }
    if !(self.pointer_strength.is_finite() && self.pointer_strength >= 0.0) {
      return Err(ConfigError::PointerStrength(self.pointer_strength));
    }
    if !self.formation_mix.is_finite() {
      return Err(ConfigError::FormationMix(self.formation_mix));
    }
    Ok(())
  }

  pub fn get(&self, field: ParamField) -> f32 {
    match field {
      ParamField::FormationMix => self.formation_mix,
      ParamField::Spring => self.spring,
      ParamField::Friction => self.friction,
      ParamField::PointerStrength => self.pointer_strength,
    }
  }

  /// Sets a single field, leaving `self` untouched if the result is invalid.
  pub fn set(&mut self, field: ParamField, value: f32) -> Result<(), ConfigError> {
    let mut next = *self;
    match field {
      ParamField::FormationMix => next.formation_mix = value,
      ParamField::Spring => next.spring = value,
      ParamField::Friction => next.friction = value,
      ParamField::PointerStrength => next.pointer_strength = value,
    }
    next.validate()?;
    *self = next;
    Ok(())
  }

  /// Applies every field of `patch` at once, or none of them.
  pub fn apply(&mut self, patch: ParameterPatch) -> Result<(), ConfigError> {
    let next = Self {
      formation_mix: patch.formation_mix.unwrap_or(self.formation_mix),
      spring: patch.spring.unwrap_or(self.spring),
      friction: patch.friction.unwrap_or(self.friction),
      pointer_strength: patch.pointer_strength.unwrap_or(self.pointer_strength),
    };
    next.validate()?;
    *self = next;
    Ok(())
  }
}
