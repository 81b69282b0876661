use glam::{Vec3, Vec4};

use crate::grid::ClothGrid;
use crate::math::direction;

/// Difference of `fetch` across `i` along one axis of length `n`.
///
/// Interior cells use the centred difference, edge cells the one-sided one.
#[inline]
fn tangent<F>(i: usize, n: usize, fetch: F) -> Vec3
where
    F: Fn(usize) -> Vec3,
{
    let lo = i.saturating_sub(1);
    let hi = (i + 1).min(n.saturating_sub(1));
    if hi == lo {
        return Vec3::ZERO;
    }
    fetch(hi) - fetch(lo)
}

/// Unit surface normal at `(u, v)`, returned with `w = 0`.
///
/// The normal is `tangent_u × tangent_v`, so a sheet lying flat in the XY
/// plane faces +Z. Degenerate neighborhoods (a single-cell axis, or folded
/// tangents) fall back to +Z.
#[inline]
pub fn normal_at<F>(grid: &ClothGrid, u: usize, v: usize, fetch: F) -> Vec4
where
    F: Fn(usize, usize) -> Vec3,
{
    let along_u = tangent(u, grid.width(), |k| fetch(k, v));
    let along_v = tangent(v, grid.height(), |k| fetch(u, k));
    let n = along_u.cross(along_v).try_normalize().unwrap_or(Vec3::Z);
    direction(n)
}
