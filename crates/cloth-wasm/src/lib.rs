use cloth_core::{ClothConfig, ClothError, ClothSolver};
use wasm_bindgen::prelude::*;

pub mod logger;
pub mod pacer;

pub use pacer::FramePacer;

fn to_js(err: ClothError) -> JsValue {
    log::error!("cloth: {err}");
    JsValue::from_str(&format!("cloth: {err}"))
}

/// One cloth scene owned by the page.
///
/// Every piece of state lives in this object, so a page may run several
/// scenes side by side. Positions and normals are exposed as pointers into
/// wasm memory, four floats per particle, for zero-copy upload to vertex
/// buffers. The pointers stay valid until the next `reconfigure` call.
#[wasm_bindgen]
pub struct ClothWorld {
    solver: ClothSolver,
    pacer: FramePacer,
    last_step_ms: f32,
}

#[wasm_bindgen]
impl ClothWorld {
    /// Build a scene from a preset name (`small_sphere`, `draped_sphere`,
    /// `round_table` or `cube_drop`) and run its first step.
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str) -> Result<ClothWorld, JsValue> {
        logger::install();
        let config = ClothConfig::preset(preset).ok_or_else(|| {
            JsValue::from_str(&format!(
                "unknown preset `{preset}`, expected one of {}",
                ClothConfig::PRESETS.join(", ")
            ))
        })?;
        let mut world = ClothWorld {
            solver: ClothSolver::new(config).map_err(to_js)?,
            pacer: FramePacer::default(),
            last_step_ms: 0.0,
        };
        world.step()?;

        log::info!(
            "ClothWorld created: preset {}, {} particles, backend {}",
            preset,
            world.particle_count(),
            world.solver.backend_name()
        );
        Ok(world)
    }

    /// Rebuild the scene with new sheet parameters, keeping collisions and
    /// the frame pacer. Rejected parameters leave the current scene running.
    #[wasm_bindgen]
    pub fn reconfigure(
        &mut self,
        resolution: usize,
        solver_iterations: u32,
        damping: f32,
        stiffness: f32,
    ) -> Result<(), JsValue> {
        let mut config = self.solver.config().clone();
        config.resolution = resolution;
        config.solver_iterations = solver_iterations;
        config.damping = damping;
        config.stiffness = stiffness;
        self.solver = ClothSolver::new(config).map_err(to_js)?;
        self.step().map(|_| ())
    }

    /// Advance one step. Returns the wall time it took in milliseconds.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<f32, JsValue> {
        let start = js_sys::Date::now();
        self.solver.step().map_err(to_js)?;
        self.last_step_ms = (js_sys::Date::now() - start) as f32;
        Ok(self.last_step_ms)
    }

    /// Call once per animation frame. Runs the paced number of steps when
    /// an update is due and returns whether the cloth moved.
    #[wasm_bindgen]
    pub fn frame(&mut self, now_ms: f64) -> Result<bool, JsValue> {
        if !self.pacer.should_update(now_ms) {
            return Ok(false);
        }
        for _ in 0..self.pacer.ticks_per_frame() {
            self.step()?;
        }
        Ok(true)
    }

    /// Restore the flat sheet and run one step.
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.solver.reset().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn set_frame_rate(&mut self, target_frame_rate: u32, ticks_per_frame: u32) {
        let paused = self.pacer.is_paused();
        self.pacer = FramePacer::new(target_frame_rate, ticks_per_frame);
        self.pacer.set_paused(paused);
    }

    #[wasm_bindgen]
    pub fn toggle_pause(&mut self) {
        self.pacer.toggle_pause();
    }

    #[wasm_bindgen]
    pub fn single_step(&mut self) {
        self.pacer.request_single_step();
    }

    #[wasm_bindgen]
    pub fn is_paused(&self) -> bool {
        self.pacer.is_paused()
    }

    /// Pointer to `4 * particle_count` position floats, or null if the last
    /// step failed.
    #[wasm_bindgen]
    pub fn positions_ptr(&self) -> *const f32 {
        if !self.solver.is_ready() {
            return std::ptr::null();
        }
        self.solver.read().positions_flat().as_ptr()
    }

    /// Pointer to `4 * particle_count` normal floats, or null if the last
    /// step failed.
    #[wasm_bindgen]
    pub fn normals_ptr(&self) -> *const f32 {
        if !self.solver.is_ready() {
            return std::ptr::null();
        }
        self.solver.read().normals_flat().as_ptr()
    }

    /// Length in floats of both the position and the normal array.
    #[wasm_bindgen]
    pub fn buffer_len(&self) -> usize {
        4 * self.particle_count()
    }

    #[wasm_bindgen]
    pub fn buffer_byte_length(&self) -> usize {
        self.buffer_len() * std::mem::size_of::<f32>()
    }

    /// Quad index list, four indices per grid quad, counter-clockwise seen from +Z.
    #[wasm_bindgen]
    pub fn quad_indices(&self) -> Vec<u32> {
        self.solver.grid().quad_indices()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.solver.grid().len()
    }

    #[wasm_bindgen]
    pub fn resolution(&self) -> usize {
        self.solver.config().resolution
    }

    #[wasm_bindgen]
    pub fn steps_taken(&self) -> f64 {
        self.solver.steps_taken() as f64
    }

    #[wasm_bindgen]
    pub fn last_step_ms(&self) -> f32 {
        self.last_step_ms
    }
}
