use glam::{Vec3, Vec4};

use crate::grid::{ClothGrid, Tile};

/// Work-group local copy of a tile plus its halo.
///
/// Relaxation reads each source position up to five times (the cell and
/// its four neighbors). Loading the tile and a ring of `halo` cells once per
/// pass turns those reads into lookups in a small contiguous array. The
/// halo is clipped at the grid border, where no neighbors exist anyway.
#[derive(Debug, Default)]
pub struct TileCache {
    u0: usize,
    v0: usize,
    width: usize,
    height: usize,
    data: Vec<Vec3>,
}

impl TileCache {
    /// Cache with room for a `block x block` tile of `grid` and its halo.
    pub fn new(grid: &ClothGrid, block: usize, halo: usize) -> Self {
        let side = block.saturating_add(halo.saturating_mul(2));
        Self {
            data: Vec::with_capacity(side.min(grid.width()) * side.min(grid.height())),
            ..Self::default()
        }
    }

    /// Copy `tile` and its halo out of `source`.
    pub fn load(&mut self, grid: &ClothGrid, source: &[Vec4], tile: Tile, halo: usize) {
        self.u0 = tile.u0.saturating_sub(halo);
        self.v0 = tile.v0.saturating_sub(halo);
        let u1 = tile.u1.saturating_add(halo).min(grid.width());
        let v1 = tile.v1.saturating_add(halo).min(grid.height());
        self.width = u1 - self.u0;
        self.height = v1 - self.v0;

        self.data.clear();
        for v in self.v0..v1 {
            let row = &source[grid.index(self.u0, v)..grid.index(u1, v)];
            self.data.extend(row.iter().map(|p| p.truncate()));
        }
    }

    /// Cached position of grid cell `(u, v)`.
    ///
    /// # Panics
    ///
    /// Panics if `(u, v)` lies outside the loaded region.
    #[inline]
    pub fn get(&self, u: usize, v: usize) -> Vec3 {
        debug_assert!(self.contains(u, v), "cell ({u}, {v}) outside cached tile");
        self.data[(v - self.v0) * self.width + (u - self.u0)]
    }

    #[inline]
    pub fn contains(&self, u: usize, v: usize) -> bool {
        u >= self.u0 && v >= self.v0 && u < self.u0 + self.width && v < self.v0 + self.height
    }

    /// Number of cached cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
