/// Constraint relaxation: structural links, then collision projection.
pub mod distance;

use glam::{Vec3, Vec4};

use crate::backend::KernelParams;
use crate::math::point;
use crate::shapes::project_all;

/// Relaxed position of cell `(u, v)`, read entirely from the pass's source
/// snapshot through `fetch`.
///
/// The structural displacement is applied first, then every enabled
/// collision volume projects the candidate out in configured order.
#[inline]
pub fn relax_cell<F>(params: &KernelParams, u: usize, v: usize, fetch: F) -> Vec4
where
    F: Fn(usize, usize) -> Vec3,
{
    let p = fetch(u, v);
    let weight = params.relaxation_weight;
    let candidate = p + distance::structural_displacement(&params.grid, u, v, weight, &fetch);
    point(project_all(&params.collisions, candidate))
}
