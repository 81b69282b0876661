use glam::{Vec3, Vec4};

/// Lengths below this are treated as zero when normalizing.
pub const EPSILON: f32 = 1e-8;

/// Homogeneous point, `w = 1`.
#[inline]
pub fn point(v: Vec3) -> Vec4 {
    v.extend(1.0)
}

/// Homogeneous direction, `w = 0`.
#[inline]
pub fn direction(v: Vec3) -> Vec4 {
    v.extend(0.0)
}
