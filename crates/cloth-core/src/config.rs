use glam::{Vec3, Vec4};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shapes::CollisionShape;

/// Everything the simulation needs, fixed for the lifetime of a solver.
///
/// Construct with [`Default`] or one of the scene presets, adjust fields,
/// then hand it to [`ClothSolver::new`](crate::solver::ClothSolver::new),
/// which calls [`validate`](Self::validate) before allocating anything.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClothConfig {
    /// Particles per side; the sheet holds `resolution²` particles.
    pub resolution: usize,
    /// Relaxation passes per step. Must be odd.
    pub solver_iterations: u32,
    /// Integration time step in seconds.
    pub timestep: f32,
    /// Gravity magnitude, applied along -Z.
    pub gravity: f32,
    /// Fraction of the implicit velocity removed each step, in `[0, 1)`.
    pub damping: f32,
    /// Fraction of link stretch removed over one full step, in `(0, 1]`.
    pub stiffness: f32,
    /// Side length of the sheet in world units.
    pub scale: f32,
    /// Offset of the sheet centre; `start.z` is the sheet height.
    pub start: Vec3,
    /// Collision volumes, resolved in this order after every pass.
    pub collisions: Vec<CollisionShape>,
    /// Side length of a dispatch block, in cells. Clamped to `resolution`.
    pub block_size: usize,
    /// Cells cached around each block during relaxation. Clamped to
    /// `resolution`.
    pub halo: usize,
}

const PLANE_HEIGHT: f32 = -12.0;
const SPHERE_RADIUS: f32 = 12.0;
const CYLINDER_RADIUS: f32 = 14.0;
const CYLINDER_HEIGHT: f32 = -2.0;
const CYLINDER_THICKNESS: f32 = 1.0;
const CUBE_SIZE: f32 = 10.0;

impl Default for ClothConfig {
    fn default() -> Self {
        Self::draped_sphere()
    }
}

impl ClothConfig {
    fn base(resolution: usize, solver_iterations: u32, damping: f32, stiffness: f32) -> Self {
        Self {
            resolution,
            solver_iterations,
            timestep: 1.0 / 60.0,
            gravity: 27.7,
            damping,
            stiffness,
            scale: 32.0,
            start: Vec3::new(0.7, 0.7, 14.1),
            collisions: Vec::new(),
            block_size: 8,
            halo: 2,
        }
    }

    /// Coarse 32×32 sheet, single pass, dropped on a ball.
    pub fn small_sphere() -> Self {
        let mut config = Self::base(32, 1, 0.0, 0.115);
        config.collisions = vec![
            CollisionShape::sphere(SPHERE_RADIUS),
            CollisionShape::plane(PLANE_HEIGHT),
        ];
        config
    }

    /// 128×128 sheet with nine passes, dropped on a ball.
    pub fn draped_sphere() -> Self {
        let mut config = Self::base(128, 9, 0.02, 0.667);
        config.collisions = vec![
            CollisionShape::sphere(SPHERE_RADIUS),
            CollisionShape::plane(PLANE_HEIGHT),
        ];
        config
    }

    /// 128×128 tablecloth settling over a round table top.
    pub fn round_table() -> Self {
        let mut config = Self::base(128, 9, 0.02, 0.667);
        config.collisions = vec![
            CollisionShape::cylinder(CYLINDER_RADIUS, CYLINDER_HEIGHT, CYLINDER_THICKNESS),
            CollisionShape::plane(PLANE_HEIGHT),
        ];
        config
    }

    /// 128×128 sheet dropped on a box.
    pub fn cube_drop() -> Self {
        let mut config = Self::base(128, 9, 0.02, 0.667);
        config.collisions = vec![
            CollisionShape::cube(CUBE_SIZE),
            CollisionShape::plane(PLANE_HEIGHT),
        ];
        config
    }

    /// Preset by name, as listed in [`PRESETS`](Self::PRESETS).
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "small_sphere" => Some(Self::small_sphere()),
            "draped_sphere" => Some(Self::draped_sphere()),
            "round_table" => Some(Self::round_table()),
            "cube_drop" => Some(Self::cube_drop()),
            _ => None,
        }
    }

    pub const PRESETS: [&'static str; 4] =
        ["small_sphere", "draped_sphere", "round_table", "cube_drop"];

    /// Total particle count.
    pub fn particle_count(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Rest length of every structural link.
    pub fn spacing(&self) -> f32 {
        self.scale / self.resolution as f32
    }

    /// Per-pass fraction of link error removed, chosen so that the full
    /// pass sequence removes `stiffness` of the stretch of an isolated link.
    pub fn relaxation_weight(&self) -> f32 {
        let passes = self.solver_iterations.max(1) as f32;
        1.0 - (1.0 - self.stiffness).powf(1.0 / passes)
    }

    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -self.gravity)
    }

    /// Check every field. Runs before any buffer is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let bytes = self
            .resolution
            .checked_mul(self.resolution)
            .and_then(|n| n.checked_mul(std::mem::size_of::<Vec4>()));
        if !bytes.is_some_and(|b| b <= isize::MAX as usize) {
            return Err(ConfigError::GridTooLarge(self.resolution));
        }
        if self.solver_iterations % 2 == 0 {
            return Err(ConfigError::EvenIterations(self.solver_iterations));
        }
        if self.block_size == 0 {
            return Err(ConfigError::EmptyBlock);
        }
        if self.halo == 0 {
            return Err(ConfigError::EmptyHalo);
        }

        check("timestep", self.timestep, |v| v > 0.0)?;
        check("gravity", self.gravity, |_| true)?;
        check("damping", self.damping, |v| (0.0..1.0).contains(&v))?;
        check("stiffness", self.stiffness, |v| v > 0.0 && v <= 1.0)?;
        check("scale", self.scale, |v| v > 0.0)?;
        let start = [
            ("start.x", self.start.x),
            ("start.y", self.start.y),
            ("start.z", self.start.z),
        ];
        for (name, value) in start {
            check(name, value, |_| true)?;
        }

        self.validate_collisions()
    }

    fn validate_collisions(&self) -> Result<(), ConfigError> {
        for shape in &self.collisions {
            match *shape {
                CollisionShape::Plane(p) => check("plane.height", p.height, |_| true)?,
                CollisionShape::Sphere(s) => check("sphere.radius", s.radius, |v| v > 0.0)?,
                CollisionShape::Cylinder(c) => {
                    check("cylinder.radius", c.radius, |v| v > 0.0)?;
                    check("cylinder.height", c.height, |_| true)?;
                    check("cylinder.thickness", c.thickness, |v| v > 0.0)?;
                }
                CollisionShape::Cube(c) => check("cube.size", c.size, |v| v > 0.0)?,
            }
        }

        for (i, shape) in self.collisions.iter().enumerate() {
            if let Some(dup) = self.collisions[..i].iter().find(|s| s.kind() == shape.kind()) {
                return Err(ConfigError::UnsupportedShapes(format!(
                    "more than one {}",
                    dup.kind()
                )));
            }
        }

        let solids: Vec<&str> = self
            .collisions
            .iter()
            .filter(|s| s.is_solid())
            .map(|s| s.kind())
            .collect();
        if solids.len() > 1 {
            return Err(ConfigError::UnsupportedShapes(format!(
                "only one solid volume may be combined with the plane, got {}",
                solids.join(" + ")
            )));
        }
        Ok(())
    }
}

fn check(
    name: &'static str,
    value: f32,
    in_range: impl Fn(f32) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && in_range(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}
