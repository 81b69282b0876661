//! Position Verlet integration and the frame bookkeeping that feeds it.
//!
//! Velocity is never stored: it is the difference between the current and
//! previous snapshots. One step predicts
//!
//! ```text
//! x' = x + (x - x_prev) * (1 - damping) + g * dt^2
//! ```

use glam::{Vec3, Vec4};

use crate::config::ClothConfig;
use crate::math::point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegrationParams {
    pub damping: f32,
    /// Gravity already multiplied by `dt²`.
    pub gravity_step: Vec3,
}

impl IntegrationParams {
    pub fn from_config(config: &ClothConfig) -> Self {
        let dt = config.timestep;
        Self {
            damping: config.damping,
            gravity_step: config.gravity_vector() * dt * dt,
        }
    }
}

/// Predicted, unconstrained position of one particle.
#[inline]
pub fn advance_particle(previous: Vec4, current: Vec4, params: &IntegrationParams) -> Vec4 {
    let x = current.truncate();
    let inertia = (x - previous.truncate()) * (1.0 - params.damping);
    point(x + inertia + params.gravity_step)
}

/// Per-cell body of the bookkeeping stage: the previous snapshot becomes
/// the current one.
#[inline]
pub fn bookkeep_particle(current: Vec4) -> Vec4 {
    current
}
