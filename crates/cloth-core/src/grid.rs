use glam::{Vec3, Vec4};

use crate::config::ClothConfig;

/// Structural neighbor offsets, in the fixed order corrections are summed.
pub const LINK_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Regular lattice of cloth particles.
///
/// Particle `(u, v)` lives at flat index `v * width + u`. Structural links
/// join each particle to its axis-aligned neighbors and are never stored:
/// they are implied by the lattice and all share the rest length `spacing`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClothGrid {
    width: usize,
    height: usize,
    spacing: f32,
}

/// Half-open rectangle of cells `[u0, u1) x [v0, v1)` handled by one work group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub u0: usize,
    pub v0: usize,
    pub u1: usize,
    pub v1: usize,
}

impl Tile {
    pub fn width(&self) -> usize {
        self.u1 - self.u0
    }

    pub fn height(&self) -> usize {
        self.v1 - self.v0
    }
}

impl ClothGrid {
    pub fn new(width: usize, height: usize, spacing: f32) -> Self {
        Self { width, height, spacing }
    }

    pub fn from_config(config: &ClothConfig) -> Self {
        Self::new(config.resolution, config.resolution, config.spacing())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rest length of every structural link.
    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, u: usize, v: usize) -> usize {
        v * self.width + u
    }

    #[inline]
    pub fn coords(&self, i: usize) -> (usize, usize) {
        (i % self.width, i / self.width)
    }

    /// Neighbor of `(u, v)` at offset `(du, dv)`, if it lies on the grid.
    #[inline]
    pub fn offset(&self, u: usize, v: usize, du: isize, dv: isize) -> Option<(usize, usize)> {
        let nu = u.checked_add_signed(du)?;
        let nv = v.checked_add_signed(dv)?;
        (nu < self.width && nv < self.height).then_some((nu, nv))
    }

    /// Existing structural neighbors of `(u, v)`: two to four of them.
    pub fn neighbors(&self, u: usize, v: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        LINK_OFFSETS
            .iter()
            .filter_map(move |&(du, dv)| self.offset(u, v, du, dv))
    }

    /// Number of distinct structural links.
    pub fn link_count(&self) -> usize {
        self.height * self.width.saturating_sub(1) + self.width * self.height.saturating_sub(1)
    }

    /// Fill `out` with a flat, evenly spaced sheet whose `(0, 0)` corner sits
    /// at `origin`. Every position has `w = 1`.
    pub fn write_flat_sheet(&self, origin: Vec3, out: &mut [Vec4]) {
        for (i, p) in out.iter_mut().enumerate().take(self.len()) {
            let (u, v) = self.coords(i);
            *p = self.rest_position(origin, u, v);
        }
    }

    #[inline]
    pub fn rest_position(&self, origin: Vec3, u: usize, v: usize) -> Vec4 {
        Vec4::new(
            origin.x + u as f32 * self.spacing,
            origin.y + v as f32 * self.spacing,
            origin.z,
            1.0,
        )
    }

    /// Cover the grid with `block x block` tiles, row by row. Tiles on the
    /// far edges are clipped.
    pub fn tiles(&self, block: usize) -> impl Iterator<Item = Tile> + '_ {
        let block = block.max(1);
        (0..self.height).step_by(block).flat_map(move |v0| {
            (0..self.width).step_by(block).map(move |u0| Tile {
                u0,
                v0,
                u1: u0.saturating_add(block).min(self.width),
                v1: v0.saturating_add(block).min(self.height),
            })
        })
    }

    /// Corner indices of every grid quad, four per quad, wound
    /// `(u, v) (u+1, v) (u+1, v+1) (u, v+1)`.
    pub fn quad_indices(&self) -> Vec<u32> {
        let quads = self.width.saturating_sub(1) * self.height.saturating_sub(1);
        let mut indices = Vec::with_capacity(quads * 4);
        for v in 0..self.height.saturating_sub(1) {
            for u in 0..self.width.saturating_sub(1) {
                indices.extend_from_slice(&[
                    self.index(u, v) as u32,
                    self.index(u + 1, v) as u32,
                    self.index(u + 1, v + 1) as u32,
                    self.index(u, v + 1) as u32,
                ]);
            }
        }
        indices
    }
}

impl ClothConfig {
    /// World position of grid cell `(0, 0)` in the initial flat sheet.
    pub fn sheet_origin(&self) -> Vec3 {
        Vec3::new(
            self.start.x - 0.5 * self.scale,
            self.start.y - 0.5 * self.scale,
            self.start.z,
        )
    }
}
