use glam::Vec4;
use rayon::prelude::*;

use crate::backend::{check_len, xyz, ComputeBackend, KernelParams, TileCache};
use crate::constraints::relax_cell;
use crate::error::BackendError;
use crate::grid::Tile;
use crate::integrate::{advance_particle, bookkeep_particle};
use crate::normals::normal_at;

/// Multi-threaded backend on the rayon global pool.
///
/// Every stage splits its output buffer into disjoint chunks; relaxation
/// uses stripes of `block_size` rows, each staged through its own
/// [`TileCache`]. Results are bit-identical to [`SerialBackend`].
///
/// [`SerialBackend`]: crate::backend::SerialBackend
#[derive(Clone, Copy, Debug, Default)]
pub struct ParallelBackend;

impl ParallelBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "rayon"
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

        provisional
            .par_iter_mut()
            .zip(previous.par_iter().zip(current.par_iter()))
            .for_each(|(out, (&prev, &cur))| {
                *out = advance_particle(prev, cur, &params.integration);
            });
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

        previous
            .par_iter_mut()
            .zip(current.par_iter())
            .for_each(|(out, &cur)| *out = bookkeep_particle(cur));
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

        let block = params.block_size.min(grid.height());
        let width = grid.width();
        destination
            .par_chunks_mut(width.saturating_mul(block).max(1))
            .enumerate()
            .for_each_init(
                || TileCache::new(grid, block, params.halo),
                |cache, (stripe, out)| {
                    let v0 = stripe * block;
                    let tile = Tile {
                        u0: 0,
                        v0,
                        u1: width,
                        v1: v0.saturating_add(block).min(grid.height()),
                    };
                    cache.load(grid, source, tile, params.halo);
                    for v in tile.v0..tile.v1 {
                        for u in 0..width {
                            out[(v - v0) * width + u] =
                                relax_cell(params, u, v, |a, b| cache.get(a, b));
                        }
                    }
                },
            );
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

        normals
            .par_chunks_mut(grid.width().max(1))
            .enumerate()
            .for_each(|(v, row)| {
                for (u, out) in row.iter_mut().enumerate() {
                    *out = normal_at(grid, u, v, |a, b| xyz(current, grid, a, b));
                }
            });
        Ok(())
    }
}
