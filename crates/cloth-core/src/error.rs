use std::collections::TryReserveError;
use std::fmt;

/// Rejected configuration. Raised by [`ClothConfig::validate`] before any
/// buffer is allocated.
///
/// [`ClothConfig::validate`]: crate::config::ClothConfig::validate
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "solver iteration count must be odd so the result lands in the current buffer, got {0}"
    )]
    EvenIterations(u32),
    #[error("cloth resolution must be at least 1")]
    EmptyGrid,
    #[error("cloth resolution {0} does not fit in addressable memory")]
    GridTooLarge(usize),
    #[error("dispatch block width must be at least 1")]
    EmptyBlock,
    #[error("halo margin must be at least 1 cell for the structural stencil")]
    EmptyHalo,
    #[error("parameter `{name}` out of range: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("unsupported collision shape combination: {0}")]
    UnsupportedShapes(String),
}

/// Failure reported by a compute backend while allocating or dispatching.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to allocate a buffer of {len} elements")]
    Allocation {
        len: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("buffer `{buffer}` has {actual} elements, expected {expected}")]
    BufferMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("dispatch failed: {0}")]
    Dispatch(String),
    #[error("kernel parameter `{name}` must be at least 1")]
    InvalidParams { name: &'static str },
    #[error("backend implements kernel revision {found}, solver expects {expected}")]
    Incompatible { expected: u32, found: u32 },
}

/// Pipeline stage a backend failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initialize,
    Advance,
    Bookkeep,
    Relax { pass: u32 },
    Normals,
    Finish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Initialize => f.write_str("initialize"),
            Stage::Advance => f.write_str("advance"),
            Stage::Bookkeep => f.write_str("bookkeep"),
            Stage::Relax { pass } => write!(f, "relax (pass {pass})"),
            Stage::Normals => f.write_str("normals"),
            Stage::Finish => f.write_str("finish"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClothError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{stage} stage failed")]
    Stage {
        stage: Stage,
        #[source]
        source: BackendError,
    },
    #[error("an earlier step failed and left the buffers torn; reset() before stepping again")]
    Failed,
}

impl ClothError {
    pub(crate) fn at(stage: Stage) -> impl FnOnce(BackendError) -> ClothError {
        move |source| ClothError::Stage { stage, source }
    }

    /// The failed stage, if this is an execution error.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ClothError::Stage { stage, .. } => Some(*stage),
            ClothError::Config(_) | ClothError::Failed => None,
        }
    }
}
