//! Second-order spring filter stepped at frame cadence.
//!
//! Integration is semi-implicit Euler (velocity first, then position), split
//! into fixed sub-steps so a 30 Hz frame integrates the same way as two 60 Hz
//! frames. Once both the displacement and the velocity drop under their rest
//! thresholds the spring snaps onto its target and stops reporting motion.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Largest integration step in seconds.
const MAX_SUBSTEP_S: f32 = 1.0 / 120.0;

/// Spring parameters. Defaults are the site's scroll smoothing
/// (stiffness 100, damping 30, rest delta 0.001).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Displacement under which the spring may come to rest.
    pub rest_delta: f32,
    /// Speed (units/s) under which the spring may come to rest.
    pub rest_speed: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 30.0,
            mass: 1.0,
            rest_delta: 0.001,
            rest_speed: 0.001,
        }
    }
}

impl SpringConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        let bad = |reason: &str| {
            Err(MotionError::InvalidSpring {
                reason: reason.to_string(),
            })
        };
        if !(self.stiffness.is_finite() && self.stiffness > 0.0) {
            return bad("stiffness must be finite and > 0");
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return bad("damping must be finite and >= 0");
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return bad("mass must be finite and > 0");
        }
        if !(self.rest_delta.is_finite() && self.rest_delta > 0.0) {
            return bad("rest_delta must be finite and > 0");
        }
        if !(self.rest_speed.is_finite() && self.rest_speed > 0.0) {
            return bad("rest_speed must be finite and > 0");
        }
        Ok(())
    }

    /// Damping ratio; 1.0 is critical, above 1.0 never overshoots.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

/// Scalar spring state.
#[derive(Clone, Debug)]
pub struct Spring {
    cfg: SpringConfig,
    position: f32,
    velocity: f32,
    target: f32,
    at_rest: bool,
}

impl Spring {
    /// A spring resting at `initial`.
    pub fn new(cfg: SpringConfig, initial: f32) -> Self {
        Self {
            cfg,
            position: initial,
            velocity: 0.0,
            target: initial,
            at_rest: true,
        }
    }

    pub fn config(&self) -> &SpringConfig {
        &self.cfg
    }

    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Retarget the spring. Wakes it only if the target actually moved.
    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() || target == self.target {
            return;
        }
        self.target = target;
        self.at_rest = false;
    }

    /// Teleport to `value` and rest there.
    pub fn jump_to(&mut self, value: f32) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    /// Advance by `dt` seconds. Returns true when the position changed.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.at_rest || !(dt.is_finite() && dt > 0.0) {
            return false;
        }
        let before = self.position;
        let steps = (dt / MAX_SUBSTEP_S).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        let inv_mass = 1.0 / self.cfg.mass;
        for _ in 0..steps {
            let displacement = self.position - self.target;
            let spring_force = -self.cfg.stiffness * displacement;
            let damping_force = -self.cfg.damping * self.velocity;
            let acceleration = (spring_force + damping_force) * inv_mass;
            self.velocity += acceleration * h;
            self.position += self.velocity * h;
        }
        if (self.target - self.position).abs() < self.cfg.rest_delta
            && self.velocity.abs() < self.cfg.rest_speed
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
            log::trace!("spring settled at {}", self.target);
        }
        self.position != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn default_is_overdamped() {
        let cfg = SpringConfig::default();
        assert!(cfg.damping_ratio() > 1.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_parameters() {
        let cfg = SpringConfig {
            stiffness: 0.0,
            ..SpringConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(MotionError::InvalidSpring { .. })
        ));
        let cfg = SpringConfig {
            damping: f32::NAN,
            ..SpringConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn resting_spring_does_not_move() {
        let mut s = Spring::new(SpringConfig::default(), 0.25);
        assert!(!s.step(FRAME));
        s.set_target(0.25);
        assert!(s.is_at_rest());
    }

    #[test]
    fn overdamped_spring_never_overshoots() {
        let mut s = Spring::new(SpringConfig::default(), 0.0);
        s.set_target(1.0);
        let mut last = 0.0;
        for _ in 0..600 {
            s.step(FRAME);
            assert!(s.position() >= last);
            assert!(s.position() <= 1.0);
            last = s.position();
        }
        assert!(s.is_at_rest());
        assert_eq!(s.position(), 1.0);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut s = Spring::new(SpringConfig::default(), 0.0);
        s.set_target(1.0);
        assert!(!s.step(0.0));
        assert_eq!(s.position(), 0.0);
        assert!(!s.is_at_rest());
    }
}
