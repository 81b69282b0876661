//! Position-based cloth on a regular particle grid.
//!
//! Each step predicts positions with damped Verlet integration, then runs
//! an odd number of Jacobi relaxation passes that restore structural link
//! lengths and push particles out of static collision volumes, ping-ponging
//! between two buffers so every pass reads a fixed snapshot. A final pass
//! estimates per-particle normals for rendering.
//!
//! ```no_run
//! use cloth_core::{ClothConfig, ClothSolver};
//!
//! let mut solver = ClothSolver::new(ClothConfig::round_table())?;
//! for _ in 0..60 {
//!     solver.step()?;
//! }
//! let view = solver.read();
//! assert_eq!(view.positions.len(), 128 * 128);
//! # Ok::<(), cloth_core::ClothError>(())
//! ```

pub mod backend;
pub mod buffers;
pub mod config;
pub mod constraints;
pub mod error;
pub mod grid;
pub mod integrate;
pub mod math;
pub mod normals;
pub mod shapes;
pub mod solver;

pub use backend::{ComputeBackend, KernelParams, SerialBackend};
#[cfg(feature = "parallel")]
pub use backend::ParallelBackend;
pub use buffers::Role;
pub use config::ClothConfig;
pub use error::{BackendError, ClothError, ConfigError, Stage};
pub use grid::ClothGrid;
pub use shapes::CollisionShape;
pub use solver::{ClothSolver, ClothView};
