//! Closed set of collision volumes the relaxation kernel can resolve against.

use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::shapes::primitives::{Collider, Cube, Cylinder, Plane, Sphere};

/// One configured collision volume.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionShape {
    Plane(Plane),
    Sphere(Sphere),
    Cylinder(Cylinder),
    Cube(Cube),
}

impl CollisionShape {
    pub fn plane(height: f32) -> Self {
        CollisionShape::Plane(Plane { height })
    }

    pub fn sphere(radius: f32) -> Self {
        CollisionShape::Sphere(Sphere { radius })
    }

    pub fn cylinder(radius: f32, height: f32, thickness: f32) -> Self {
        CollisionShape::Cylinder(Cylinder { radius, height, thickness })
    }

    pub fn cube(size: f32) -> Self {
        CollisionShape::Cube(Cube { size })
    }

    /// Short lowercase name, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CollisionShape::Plane(_) => "plane",
            CollisionShape::Sphere(_) => "sphere",
            CollisionShape::Cylinder(_) => "cylinder",
            CollisionShape::Cube(_) => "cube",
        }
    }

    /// Solid volumes occupy a bounded region; the plane is a half-space.
    pub fn is_solid(&self) -> bool {
        !matches!(self, CollisionShape::Plane(_))
    }
}

impl Collider for CollisionShape {
    #[inline]
    fn contains(&self, p: Vec3) -> bool {
        match self {
            CollisionShape::Plane(s) => s.contains(p),
            CollisionShape::Sphere(s) => s.contains(p),
            CollisionShape::Cylinder(s) => s.contains(p),
            CollisionShape::Cube(s) => s.contains(p),
        }
    }

    #[inline]
    fn project(&self, p: Vec3) -> Vec3 {
        match self {
            CollisionShape::Plane(s) => s.project(p),
            CollisionShape::Sphere(s) => s.project(p),
            CollisionShape::Cylinder(s) => s.project(p),
            CollisionShape::Cube(s) => s.project(p),
        }
    }
}

/// Project `p` out of every shape, in slice order.
#[inline]
pub fn project_all(shapes: &[CollisionShape], p: Vec3) -> Vec3 {
    shapes.iter().fold(p, |q, shape| shape.project(q))
}
