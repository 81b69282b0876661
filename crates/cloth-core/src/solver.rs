use glam::Vec4;

use crate::backend::{default_backend, ComputeBackend, KernelParams, KERNEL_VERSION};
use crate::buffers::{final_role, role_for, BufferPool, Role};
use crate::config::ClothConfig;
use crate::error::{BackendError, ClothError, Stage};
use crate::grid::ClothGrid;

/// Where the pipeline stands relative to read-back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PipelineState {
    /// No buffers: initialization never ran or failed.
    Empty,
    /// Buffers exist but no step has completed since they were built or
    /// since the current dispatch began.
    Initialized,
    /// The last step ran to its completion barrier.
    Ready,
    /// The last step failed part-way; buffers are inconsistent.
    Failed,
}

/// Read-only view of the settled cloth after a completed step.
///
/// Both arrays hold `grid.len()` four-float elements in grid storage order
/// (`v * width + u`). Positions carry `w = 1`, normals `w = 0`.
#[derive(Clone, Copy, Debug)]
pub struct ClothView<'a> {
    pub grid: ClothGrid,
    pub positions: &'a [Vec4],
    pub normals: &'a [Vec4],
}

impl<'a> ClothView<'a> {
    /// Positions as a flat `[x, y, z, w, x, y, z, w, ...]` array.
    pub fn positions_flat(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.positions)
    }

    /// Normals as a flat `[x, y, z, w, ...]` array.
    pub fn normals_flat(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.normals)
    }
}

/// Cloth pipeline orchestrator.
///
/// Owns the three position buffers and the normal field, and sequences
/// each step as: advance, bookkeep, the odd sequence of relaxation passes,
/// normal estimation, completion barrier. Kernel work is delegated to the
/// injected [`ComputeBackend`].
///
/// Calls must be serialized by the caller; the solver is `Send` but takes
/// `&mut self` for every mutation.
pub struct ClothSolver {
    config: ClothConfig,
    params: KernelParams,
    backend: Box<dyn ComputeBackend>,
    buffers: Option<BufferPool>,
    state: PipelineState,
    steps: u64,
}

impl ClothSolver {
    /// Validate `config` and initialize on the default backend.
    pub fn new(config: ClothConfig) -> Result<Self, ClothError> {
        Self::with_backend(config, default_backend())
    }

    /// Validate `config` and initialize on `backend`.
    ///
    /// The configuration is checked before any buffer is allocated.
    pub fn with_backend(
        config: ClothConfig,
        backend: Box<dyn ComputeBackend>,
    ) -> Result<Self, ClothError> {
        config.validate()?;

        let found = backend.kernel_version();
        if found != KERNEL_VERSION {
            return Err(ClothError::at(Stage::Initialize)(BackendError::Incompatible {
                expected: KERNEL_VERSION,
                found,
            }));
        }

        let params = KernelParams::from_config(&config);
        let mut solver = Self {
            config,
            params,
            backend,
            buffers: None,
            state: PipelineState::Empty,
            steps: 0,
        };
        solver.initialize()?;

        log::info!(
            "cloth solver ready: {0}x{0} particles, {1} passes, backend {2}, collisions [{3}]",
            solver.config.resolution,
            solver.config.solver_iterations,
            solver.backend.name(),
            solver
                .config
                .collisions
                .iter()
                .map(|s| s.kind())
                .collect::<Vec<_>>()
                .join(", "),
        );
        Ok(solver)
    }

    /// Allocate all four buffers and lay the flat sheet into Previous and
    /// Current. Any earlier buffers are released first.
    ///
    /// On failure the solver holds no buffers until a later call succeeds.
    pub fn initialize(&mut self) -> Result<(), ClothError> {
        self.buffers = None;
        self.state = PipelineState::Empty;
        self.steps = 0;

        let grid = self.params.grid;
        let allocate = || {
            self.backend
                .allocate(grid.len())
                .map_err(ClothError::at(Stage::Initialize))
        };
        let mut previous = allocate()?;
        let mut current = allocate()?;
        let provisional = allocate()?;
        let normals = allocate()?;

        grid.write_flat_sheet(self.config.sheet_origin(), &mut previous);
        current.copy_from_slice(&previous);

        self.buffers = Some(BufferPool::new([previous, current, provisional], normals));
        self.state = PipelineState::Initialized;
        Ok(())
    }

    /// Advance the simulation by one time step and wait for completion.
    ///
    /// After a failed step the buffers may be half written, so every later
    /// call returns [`ClothError::Failed`] until [`reset`](Self::reset) or
    /// [`initialize`](Self::initialize) succeeds.
    ///
    /// # Panics
    ///
    /// Panics if the solver holds no buffers, i.e. the last
    /// [`initialize`](Self::initialize) failed and its error was ignored.
    pub fn step(&mut self) -> Result<(), ClothError> {
        if self.state == PipelineState::Failed {
            return Err(ClothError::Failed);
        }
        match self.dispatch() {
            Ok(()) => {
                self.state = PipelineState::Ready;
                self.steps += 1;
                log::trace!("cloth step {} complete", self.steps);
                Ok(())
            }
            Err(err) => {
                self.state = PipelineState::Failed;
                log::warn!("cloth step {} failed: {}", self.steps + 1, err);
                Err(err)
            }
        }
    }

    fn dispatch(&mut self) -> Result<(), ClothError> {
        let passes = self.config.solver_iterations;
        assert_eq!(
            final_role(passes),
            Some(Role::Current),
            "relaxation must finish in the current buffer; pass count {passes} is not odd"
        );

        let params = &self.params;
        let backend = self.backend.as_ref();
        let buffers = match self.buffers.as_mut() {
            Some(buffers) => buffers,
            None => panic!("cloth solver has no buffers; initialize() failed or was never run"),
        };
        self.state = PipelineState::Initialized;

        // Advance reads Previous, which bookkeeping overwrites, so it goes first.
        let (previous, current, provisional) = buffers.advance_views();
        backend
            .advance(params, previous, current, provisional)
            .map_err(ClothError::at(Stage::Advance))?;

        let (current, previous) = buffers.split(Role::Current, Role::Previous);
        backend
            .bookkeep(params, current, previous)
            .map_err(ClothError::at(Stage::Bookkeep))?;

        for pass in 0..passes {
            let (source, destination) = role_for(pass);
            let (source, destination) = buffers.split(source, destination);
            backend
                .relax(params, source, destination)
                .map_err(ClothError::at(Stage::Relax { pass }))?;
        }

        let (current, normals) = buffers.normal_views();
        backend
            .estimate_normals(params, current, normals)
            .map_err(ClothError::at(Stage::Normals))?;

        backend.finish().map_err(ClothError::at(Stage::Finish))
    }

    /// Rebuild the flat sheet and run one step so that read-back is valid
    /// immediately. Views taken before the reset no longer reflect the cloth.
    pub fn reset(&mut self) -> Result<(), ClothError> {
        log::debug!("resetting cloth after {} steps", self.steps);
        self.initialize()?;
        self.step()
    }

    /// Settled positions and normals of the last completed step.
    ///
    /// # Panics
    ///
    /// Panics unless the most recent [`step`](Self::step) or
    /// [`reset`](Self::reset) completed successfully. Returning stale or
    /// half-written data instead would hide a sequencing bug.
    pub fn read(&self) -> ClothView<'_> {
        assert_eq!(
            self.state,
            PipelineState::Ready,
            "read() requires a completed step()"
        );
        match &self.buffers {
            Some(buffers) => ClothView {
                grid: self.params.grid,
                positions: buffers.get(Role::Current),
                normals: buffers.normals(),
            },
            None => unreachable!("a ready pipeline always holds buffers"),
        }
    }

    /// Raw contents of one position role, for diagnostics.
    ///
    /// Unlike [`read`](Self::read) this does not require a completed step.
    pub fn buffer(&self, role: Role) -> Option<&[Vec4]> {
        self.buffers.as_ref().map(|b| b.get(role))
    }

    /// `true` once a step has completed and no later step has failed.
    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }

    pub fn config(&self) -> &ClothConfig {
        &self.config
    }

    pub fn grid(&self) -> &ClothGrid {
        &self.params.grid
    }

    pub fn params(&self) -> &KernelParams {
        &self.params
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Steps completed since the last initialization.
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }
}
