//! Static analytic collision volumes.
//!
//! Every volume is a pure function of its parameters. `contains` is strict:
//! a point lying exactly on the boundary is outside, so `project` leaves it
//! untouched.

use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Containment test and boundary projection for a static volume.
pub trait Collider {
    /// `true` when `p` is strictly inside the volume.
    fn contains(&self, p: Vec3) -> bool;

    /// Nearest point on the boundary if `p` is inside, otherwise `p`.
    fn project(&self, p: Vec3) -> Vec3;
}

/// Horizontal floor. Everything below `height` is solid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    pub height: f32,
}

impl Collider for Plane {
    #[inline]
    fn contains(&self, p: Vec3) -> bool {
        p.z < self.height
    }

    #[inline]
    fn project(&self, p: Vec3) -> Vec3 {
        if self.contains(p) {
            Vec3::new(p.x, p.y, self.height)
        } else {
            p
        }
    }
}

/// Ball centred at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sphere {
    pub radius: f32,
}

impl Collider for Sphere {
    #[inline]
    fn contains(&self, p: Vec3) -> bool {
        p.length_squared() < self.radius * self.radius
    }

    fn project(&self, p: Vec3) -> Vec3 {
        if !self.contains(p) {
            return p;
        }
        // The centre has no nearest boundary point; push it straight up.
        let dir = p.try_normalize().unwrap_or(Vec3::Z);
        dir * self.radius
    }
}

/// Flat disc ("round table") around the Z axis.
///
/// `height` is the z of the disc's mid-plane and `thickness` its full
/// extent along Z.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cylinder {
    pub radius: f32,
    pub height: f32,
    pub thickness: f32,
}

impl Cylinder {
    #[inline]
    fn half_thickness(&self) -> f32 {
        0.5 * self.thickness
    }
}

impl Collider for Cylinder {
    #[inline]
    fn contains(&self, p: Vec3) -> bool {
        let radial = Vec2::new(p.x, p.y).length_squared();
        radial < self.radius * self.radius && (p.z - self.height).abs() < self.half_thickness()
    }

    fn project(&self, p: Vec3) -> Vec3 {
        if !self.contains(p) {
            return p;
        }
        let half = self.half_thickness();
        let top = self.height + half;
        let bottom = self.height - half;

        let to_top = top - p.z;
        let to_bottom = p.z - bottom;
        let planar = Vec2::new(p.x, p.y);
        let rho = planar.length();
        let to_side = self.radius - rho;

        if to_side < to_top && to_side < to_bottom {
            let dir = planar.try_normalize().unwrap_or(Vec2::X);
            let rim = dir * self.radius;
            Vec3::new(rim.x, rim.y, p.z)
        } else if to_top <= to_bottom {
            Vec3::new(p.x, p.y, top)
        } else {
            Vec3::new(p.x, p.y, bottom)
        }
    }
}

/// Axis-aligned box centred at the origin with half-extent `size`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cube {
    pub size: f32,
}

impl Collider for Cube {
    #[inline]
    fn contains(&self, p: Vec3) -> bool {
        p.abs().max_element() < self.size
    }

    fn project(&self, p: Vec3) -> Vec3 {
        if !self.contains(p) {
            return p;
        }
        // Exit through the face with the least penetration. Ties prefer
        // z, then y, then x, so a point resting on top stays on top.
        let depth = Vec3::splat(self.size) - p.abs();
        let mut out = p;
        let face = |c: f32| if c < 0.0 { -self.size } else { self.size };
        if depth.z <= depth.x && depth.z <= depth.y {
            out.z = face(p.z);
        } else if depth.y <= depth.x {
            out.y = face(p.y);
        } else {
            out.x = face(p.x);
        }
        out
    }
}
