//! Execution of the four per-cell routines over the whole grid.
//!
//! The orchestrator never runs kernel code itself. It hands buffers to a
//! [`ComputeBackend`], which dispatches one routine over every cell and
//! returns once all writes are visible. Each routine reads only from its
//! input slices and writes only to its output slice, so the order in which
//! cells are processed cannot change the result.

pub mod serial;
pub mod tile;
#[cfg(feature = "parallel")]
pub mod parallel;

use std::collections::TryReserveError;

use glam::{Vec3, Vec4};

use crate::config::ClothConfig;
use crate::error::BackendError;
use crate::grid::ClothGrid;
use crate::integrate::IntegrationParams;
use crate::shapes::CollisionShape;

pub use serial::SerialBackend;
pub use tile::TileCache;
#[cfg(feature = "parallel")]
pub use parallel::ParallelBackend;

/// Call signature revision of [`ComputeBackend`]. Backends built against a
/// different revision are refused at solver construction.
pub const KERNEL_VERSION: u32 = 1;

/// Everything a routine needs besides its buffers. Built once from a
/// validated [`ClothConfig`] and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelParams {
    pub grid: ClothGrid,
    pub integration: IntegrationParams,
    /// Per-pass fraction of structural error removed.
    pub relaxation_weight: f32,
    pub collisions: Vec<CollisionShape>,
    /// Side of a work group in cells.
    pub block_size: usize,
    /// Cells cached around each work group during relaxation.
    pub halo: usize,
}

impl KernelParams {
    pub fn from_config(config: &ClothConfig) -> Self {
        Self {
            grid: ClothGrid::from_config(config),
            integration: IntegrationParams::from_config(config),
            relaxation_weight: config.relaxation_weight(),
            collisions: config.collisions.clone(),
            block_size: config.block_size.min(config.resolution),
            halo: config.halo.min(config.resolution),
        }
    }

    /// Scratch elements a work group caches during relaxation. The halo is
    /// clipped at the grid border, so no cache exceeds the grid.
    pub fn tile_cache_len(&self) -> usize {
        let side = self.block_size.saturating_add(self.halo.saturating_mul(2));
        side.min(self.grid.width()) * side.min(self.grid.height())
    }

    /// Reject parameters the relaxation stencil cannot run with. Parameters
    /// built by [`from_config`](Self::from_config) always pass.
    pub fn check(&self) -> Result<(), BackendError> {
        if self.block_size == 0 {
            return Err(BackendError::InvalidParams { name: "block_size" });
        }
        if self.halo == 0 {
            return Err(BackendError::InvalidParams { name: "halo" });
        }
        Ok(())
    }
}

/// Compute collaborator that runs the per-cell routines.
///
/// Every dispatch method covers all `grid.len()` cells and must not return
/// before its writes are complete.
pub trait ComputeBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Revision of the routine signatures this backend implements.
    fn kernel_version(&self) -> u32 {
        KERNEL_VERSION
    }

    /// Allocate a zeroed buffer of `len` elements.
    fn allocate(&self, len: usize) -> Result<Vec<Vec4>, BackendError> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|source: TryReserveError| BackendError::Allocation { len, source })?;
        buffer.resize(len, Vec4::ZERO);
        Ok(buffer)
    }

    /// `provisional = advance(previous, current)`.
    fn advance(
        &self,
        params: &KernelParams,
        previous: &[Vec4],
        current: &[Vec4],
        provisional: &mut [Vec4],
    ) -> Result<(), BackendError>;

    /// `previous = current`.
    fn bookkeep(
        &self,
        params: &KernelParams,
        current: &[Vec4],
        previous: &mut [Vec4],
    ) -> Result<(), BackendError>;

    /// One Jacobi relaxation pass from `source` into `destination`.
    fn relax(
        &self,
        params: &KernelParams,
        source: &[Vec4],
        destination: &mut [Vec4],
    ) -> Result<(), BackendError>;

    /// `normals = estimate_normals(current)`.
    fn estimate_normals(
        &self,
        params: &KernelParams,
        current: &[Vec4],
        normals: &mut [Vec4],
    ) -> Result<(), BackendError>;

    /// Completion barrier. Backends that dispatch synchronously have
    /// nothing to wait for.
    fn finish(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Best backend compiled into this build.
pub fn default_backend() -> Box<dyn ComputeBackend> {
    #[cfg(feature = "parallel")]
    {
        Box::new(ParallelBackend::new())
    }
    #[cfg(not(feature = "parallel"))]
    {
        Box::new(SerialBackend::new())
    }
}

/// Reject a buffer whose length does not match the grid.
pub fn check_len(
    buffer: &'static str,
    data: &[Vec4],
    grid: &ClothGrid,
) -> Result<(), BackendError> {
    if data.len() == grid.len() {
        Ok(())
    } else {
        Err(BackendError::BufferMismatch {
            buffer,
            expected: grid.len(),
            actual: data.len(),
        })
    }
}

#[inline]
pub(crate) fn xyz(data: &[Vec4], grid: &ClothGrid, u: usize, v: usize) -> Vec3 {
    data[grid.index(u, v)].truncate()
}
