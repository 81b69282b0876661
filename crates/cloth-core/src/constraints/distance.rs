use glam::Vec3;

use crate::grid::ClothGrid;
use crate::math::EPSILON;

/// Structural link correction for one endpoint.
///
/// Moves `p` along the link toward `q` by half the length error, so that
/// when both endpoints apply their share the link returns to `rest_length`.
/// A stretched link pulls `p` toward `q`; a compressed one pushes it away.
#[inline]
pub fn link_correction(p: Vec3, q: Vec3, rest_length: f32) -> Vec3 {
    let d = q - p;
    let len = d.length();
    if len < EPSILON {
        return Vec3::ZERO;
    }
    d * (0.5 * (len - rest_length) / len)
}

/// Net structural displacement of cell `(u, v)` for one Jacobi pass.
///
/// Corrections from every existing link are summed, averaged over the
/// link count and scaled by `weight`. Edge and corner cells simply have
/// fewer links. `fetch` returns source positions and is never given a cell
/// outside the grid.
#[inline]
pub fn structural_displacement<F>(
    grid: &ClothGrid,
    u: usize,
    v: usize,
    weight: f32,
    fetch: F,
) -> Vec3
where
    F: Fn(usize, usize) -> Vec3,
{
    let p = fetch(u, v);
    let rest = grid.spacing();
    let mut correction = Vec3::ZERO;
    let mut count = 0u32;
    for (nu, nv) in grid.neighbors(u, v) {
        correction += link_correction(p, fetch(nu, nv), rest);
        count += 1;
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    correction * (weight / count as f32)
}

/// Largest absolute deviation of any structural link from its rest length.
pub fn max_link_error(grid: &ClothGrid, positions: &[glam::Vec4]) -> f32 {
    let rest = grid.spacing();
    let mut worst = 0.0_f32;
    for v in 0..grid.height() {
        for u in 0..grid.width() {
            let p = positions[grid.index(u, v)].truncate();
            // Right and up links only, so each link is measured once.
            for (nu, nv) in [(u + 1, v), (u, v + 1)] {
                if nu < grid.width() && nv < grid.height() {
                    let q = positions[grid.index(nu, nv)].truncate();
                    worst = worst.max(((q - p).length() - rest).abs());
                }
            }
        }
    }
    worst
}
