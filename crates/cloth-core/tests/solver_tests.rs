use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use cloth_core::backend::{ComputeBackend, KernelParams, SerialBackend};
use cloth_core::{
    BackendError, ClothConfig, ClothError, ClothSolver, CollisionShape, ConfigError, Role, Stage,
};
use glam::{Vec3, Vec4};

/// 4×4 sheet with unit spacing at height 10 over a plane.
fn example_config(plane: f32) -> ClothConfig {
    let mut config = ClothConfig::small_sphere();
    config.resolution = 4;
    config.scale = 4.0;
    config.start = Vec3::new(0.0, 0.0, 10.0);
    config.gravity = 9.8;
    config.timestep = 1.0 / 60.0;
    config.damping = 0.0;
    config.solver_iterations = 1;
    config.collisions = vec![CollisionShape::plane(plane)];
    config
}

fn serial(config: ClothConfig) -> ClothSolver {
    ClothSolver::with_backend(config, Box::new(SerialBackend)).unwrap()
}

/// Serial backend that counts allocations and can fail one relax call.
#[derive(Default)]
struct FaultyBackend {
    allocations: Arc<AtomicUsize>,
    relax_calls: AtomicU32,
    fail_relax_call: Option<u32>,
    bookkeep_calls: AtomicU32,
    /// Bookkeeping call that copies only the first half of the rows, then fails.
    tear_bookkeep_call: Option<u32>,
    fail_allocation: bool,
    version: Option<u32>,
}

impl ComputeBackend for FaultyBackend {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn kernel_version(&self) -> u32 {
        self.version.unwrap_or(cloth_core::backend::KERNEL_VERSION)
    }

    fn allocate(&self, len: usize) -> Result<Vec<Vec4>, BackendError> {
        self.allocations.fetch_add(1, Ordering::SeqCst);
        if self.fail_allocation {
            return Err(BackendError::Dispatch("out of device memory".into()));
        }
        SerialBackend.allocate(len)
    }

    fn advance(
        &self,
        params: &KernelParams,
        previous: &[Vec4],
        current: &[Vec4],
        provisional: &mut [Vec4],
    ) -> Result<(), BackendError> {
        SerialBackend.advance(params, previous, current, provisional)
    }

    fn bookkeep(
        &self,
        params: &KernelParams,
        current: &[Vec4],
        previous: &mut [Vec4],
    ) -> Result<(), BackendError> {
        let call = self.bookkeep_calls.fetch_add(1, Ordering::SeqCst);
        if self.tear_bookkeep_call == Some(call) {
            let half = current.len() / 2;
            previous[..half].copy_from_slice(&current[..half]);
            return Err(BackendError::Dispatch("device lost mid-copy".into()));
        }
        SerialBackend.bookkeep(params, current, previous)
    }

    fn relax(
        &self,
        params: &KernelParams,
        source: &[Vec4],
        destination: &mut [Vec4],
    ) -> Result<(), BackendError> {
        let call = self.relax_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_relax_call == Some(call) {
            return Err(BackendError::Dispatch("device lost".into()));
        }
        SerialBackend.relax(params, source, destination)
    }

    fn estimate_normals(
        &self,
        params: &KernelParams,
        current: &[Vec4],
        normals: &mut [Vec4],
    ) -> Result<(), BackendError> {
        SerialBackend.estimate_normals(params, current, normals)
    }
}

#[test]
fn test_even_iterations_rejected_before_allocation() {
    let allocations = Arc::new(AtomicUsize::new(0));
    let backend = FaultyBackend {
        allocations: allocations.clone(),
        ..Default::default()
    };
    let mut config = example_config(9.5);
    config.solver_iterations = 4;

    let err = ClothSolver::with_backend(config, Box::new(backend)).err().unwrap();
    assert!(matches!(err, ClothError::Config(ConfigError::EvenIterations(4))), "{err}");
    assert_eq!(allocations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invalid_parameters_rejected() {
    let mut config = example_config(9.5);
    config.damping = 1.0;
    assert!(matches!(
        ClothSolver::new(config).err(),
        Some(ClothError::Config(ConfigError::InvalidParameter { name: "damping", .. }))
    ));

    let mut config = example_config(9.5);
    config.resolution = 0;
    assert!(matches!(
        ClothSolver::new(config).err(),
        Some(ClothError::Config(ConfigError::EmptyGrid))
    ));

    let mut config = example_config(9.5);
    config.collisions.push(CollisionShape::plane(0.0));
    assert!(matches!(
        ClothSolver::new(config).err(),
        Some(ClothError::Config(ConfigError::UnsupportedShapes(_)))
    ));

    let mut config = example_config(9.5);
    config.collisions = vec![CollisionShape::sphere(2.0), CollisionShape::cube(1.0)];
    assert!(matches!(
        ClothSolver::new(config).err(),
        Some(ClothError::Config(ConfigError::UnsupportedShapes(_)))
    ));
}

#[test]
fn test_first_step_falls_freely() {
    let mut solver = serial(example_config(9.5));
    solver.step().unwrap();
    let view = solver.read();

    let expected_z = 10.0 - 9.8 / 3600.0;
    for (i, p) in view.positions.iter().enumerate() {
        let (u, v) = view.grid.coords(i);
        assert!((p.z - expected_z).abs() < 1e-5, "particle {i} at z={}", p.z);
        assert_eq!(p.x, -2.0 + u as f32);
        assert_eq!(p.y, -2.0 + v as f32);
        assert_eq!(p.w, 1.0);
    }
}

#[test]
fn test_first_step_stopped_by_plane() {
    let mut solver = serial(example_config(10.1));
    solver.step().unwrap();
    for p in solver.read().positions {
        assert_eq!(p.z, 10.1);
    }
}

#[test]
fn test_plane_containment_over_many_steps() {
    let mut config = ClothConfig::small_sphere();
    config.resolution = 16;
    config.solver_iterations = 3;
    config.collisions = vec![CollisionShape::plane(8.0)];
    let mut solver = serial(config);

    for _ in 0..240 {
        solver.step().unwrap();
        for p in solver.read().positions {
            assert!(p.z >= 8.0, "particle below plane: {:?}", p);
        }
    }
    // The sheet has reached the floor.
    let lowest = solver.read().positions.iter().map(|p| p.z).fold(f32::MAX, f32::min);
    assert_eq!(lowest, 8.0);
}

#[test]
fn test_sphere_containment_over_many_steps() {
    let mut solver = serial(ClothConfig::small_sphere());
    for step in 0..300 {
        solver.step().unwrap();
        for (i, p) in solver.read().positions.iter().enumerate() {
            let r = p.truncate().length();
            assert!(r >= 12.0 - 1e-3, "step {step}: particle {i} inside sphere at r={r}");
            assert!(p.is_finite());
        }
    }
}

#[test]
fn test_identical_runs_are_identical() {
    let run = || {
        let mut solver = serial(ClothConfig::small_sphere());
        for _ in 0..50 {
            solver.step().unwrap();
        }
        solver.read().positions.to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_reset_restores_flat_sheet() {
    let config = ClothConfig::small_sphere();
    let mut solver = serial(config.clone());
    for _ in 0..30 {
        solver.step().unwrap();
    }
    assert_eq!(solver.steps_taken(), 30);

    solver.reset().unwrap();
    assert!(solver.is_ready());
    assert_eq!(solver.steps_taken(), 1);

    let grid = *solver.grid();
    let mut sheet = vec![Vec4::ZERO; grid.len()];
    grid.write_flat_sheet(config.sheet_origin(), &mut sheet);
    assert_eq!(solver.buffer(Role::Previous), Some(sheet.as_slice()));

    let mut fresh = serial(config);
    fresh.step().unwrap();
    assert_eq!(solver.read().positions, fresh.read().positions);
    assert_eq!(solver.read().normals, fresh.read().normals);
}

#[test]
#[should_panic(expected = "completed step")]
fn test_read_before_step_panics() {
    let solver = serial(example_config(9.5));
    let _ = solver.read();
}

#[test]
fn test_failed_relax_pass_is_reported() {
    let backend = FaultyBackend {
        fail_relax_call: Some(1),
        ..Default::default()
    };
    let mut config = example_config(9.5);
    config.solver_iterations = 3;
    let mut solver = ClothSolver::with_backend(config, Box::new(backend)).unwrap();

    let err = solver.step().unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Relax { pass: 1 }));
    assert!(err.to_string().contains("pass 1"), "{err}");
    assert!(!solver.is_ready());
    assert_eq!(solver.steps_taken(), 0);

    // The fault was transient: a reset rebuilds a consistent state.
    solver.reset().unwrap();
    assert!(solver.is_ready());
}

#[test]
#[should_panic(expected = "completed step")]
fn test_read_after_failed_step_panics() {
    let backend = FaultyBackend {
        fail_relax_call: Some(0),
        ..Default::default()
    };
    let mut solver = ClothSolver::with_backend(example_config(9.5), Box::new(backend)).unwrap();
    assert!(solver.step().is_err());
    let _ = solver.read();
}

#[test]
fn test_step_after_failure_requires_reset() {
    let backend = FaultyBackend {
        tear_bookkeep_call: Some(1),
        ..Default::default()
    };
    let mut solver = ClothSolver::with_backend(example_config(9.5), Box::new(backend)).unwrap();
    solver.step().unwrap();

    let err = solver.step().unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Bookkeep));

    // Torn buffers must not be stepped on or served.
    for _ in 0..2 {
        let err = solver.step().unwrap_err();
        assert!(matches!(err, ClothError::Failed), "{err}");
        assert!(err.stage().is_none());
        assert!(!solver.is_ready());
    }
    assert_eq!(solver.steps_taken(), 1);

    solver.reset().unwrap();
    solver.step().unwrap();
    let z = solver.read().positions[0].z;
    for p in solver.read().positions {
        assert_eq!(p.z, z, "sheet must fall as one piece");
    }
}

#[test]
fn test_oversized_grid_rejected_before_allocation() {
    let allocations = Arc::new(AtomicUsize::new(0));
    let backend = FaultyBackend {
        allocations: allocations.clone(),
        ..Default::default()
    };
    let mut config = example_config(9.5);
    config.resolution = 1 << 33;

    let err = ClothSolver::with_backend(config, Box::new(backend)).err().unwrap();
    assert!(matches!(err, ClothError::Config(ConfigError::GridTooLarge(_))), "{err}");
    assert_eq!(allocations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_oversized_block_and_halo_are_clamped() {
    let mut reference = serial(example_config(9.5));
    let mut config = example_config(9.5);
    config.block_size = 1 << 40;
    config.halo = 1 << 40;
    let mut clamped = serial(config);
    assert_eq!(clamped.params().block_size, 4);
    assert_eq!(clamped.params().halo, 4);

    for _ in 0..5 {
        reference.step().unwrap();
        clamped.step().unwrap();
    }
    assert_eq!(reference.read().positions, clamped.read().positions);
}

#[test]
fn test_failed_allocation_is_reported() {
    let backend = FaultyBackend {
        fail_allocation: true,
        ..Default::default()
    };
    let err = ClothSolver::with_backend(example_config(9.5), Box::new(backend)).err().unwrap();
    assert_eq!(err.stage(), Some(Stage::Initialize));
}

#[test]
fn test_kernel_version_mismatch_rejected() {
    let allocations = Arc::new(AtomicUsize::new(0));
    let backend = FaultyBackend {
        allocations: allocations.clone(),
        version: Some(2),
        ..Default::default()
    };
    let err = ClothSolver::with_backend(example_config(9.5), Box::new(backend)).err().unwrap();
    assert!(matches!(
        err,
        ClothError::Stage {
            stage: Stage::Initialize,
            source: BackendError::Incompatible { expected: 1, found: 2 },
        }
    ));
    assert_eq!(allocations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_solver_reports_configuration() {
    let solver = serial(ClothConfig::round_table());
    assert_eq!(solver.backend_name(), "serial");
    assert_eq!(solver.grid().len(), 128 * 128);
    assert_eq!(solver.steps_taken(), 0);
    assert!(!solver.is_ready());
    assert_eq!(solver.params().collisions.len(), 2);
    assert_eq!(solver.config(), &ClothConfig::round_table());
}
