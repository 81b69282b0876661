use glam::Vec4;

use crate::backend::{check_len, xyz, ComputeBackend, KernelParams, TileCache};
use crate::constraints::relax_cell;
use crate::error::BackendError;
use crate::integrate::{advance_particle, bookkeep_particle};
use crate::normals::normal_at;

/// Single-threaded backend that walks the grid one block at a time.
///
/// Relaxation stages each block through a [`TileCache`] the way a GPU work
/// group stages it in local memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialBackend;

impl SerialBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for SerialBackend {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn advance(
        &self,
        params: &KernelParams,
        previous: &[Vec4],
        current: &[Vec4],
        provisional: &mut [Vec4],
    ) -> Result<(), BackendError> {
        check_len("previous", previous, &params.grid)?;
        check_len("current", current, &params.grid)?;
        check_len("provisional", provisional, &params.grid)?;

        for ((out, &prev), &cur) in provisional.iter_mut().zip(previous).zip(current) {
            *out = advance_particle(prev, cur, &params.integration);
        }
        Ok(())
    }

    fn bookkeep(
        &self,
        params: &KernelParams,
        current: &[Vec4],
        previous: &mut [Vec4],
    ) -> Result<(), BackendError> {
        check_len("current", current, &params.grid)?;
        check_len("previous", previous, &params.grid)?;

        for (out, &cur) in previous.iter_mut().zip(current) {
            *out = bookkeep_particle(cur);
        }
        Ok(())
    }

    fn relax(
        &self,
        params: &KernelParams,
        source: &[Vec4],
        destination: &mut [Vec4],
    ) -> Result<(), BackendError> {
        let grid = &params.grid;
        check_len("source", source, grid)?;
        check_len("destination", destination, grid)?;
        params.check()?;

        let mut cache = TileCache::new(grid, params.block_size, params.halo);
        for tile in grid.tiles(params.block_size) {
            cache.load(grid, source, tile, params.halo);
            for v in tile.v0..tile.v1 {
                for u in tile.u0..tile.u1 {
                    destination[grid.index(u, v)] =
                        relax_cell(params, u, v, |a, b| cache.get(a, b));
                }
            }
        }
        Ok(())
    }

    fn estimate_normals(
        &self,
        params: &KernelParams,
        current: &[Vec4],
        normals: &mut [Vec4],
    ) -> Result<(), BackendError> {
        let grid = &params.grid;
        check_len("current", current, grid)?;
        check_len("normals", normals, grid)?;

        for (i, out) in normals.iter_mut().enumerate() {
            let (u, v) = grid.coords(i);
            *out = normal_at(grid, u, v, |a, b| xyz(current, grid, a, b));
        }
        Ok(())
    }
}
