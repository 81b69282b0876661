/// Decides on which animation frames the simulation advances.
///
/// The host calls [`should_update`](Self::should_update) once per rendered
/// frame with a millisecond clock. An update is due once more than
/// `1000 / target_frame_rate` whole milliseconds have passed since the last
/// one, and runs [`ticks_per_frame`](Self::ticks_per_frame) solver steps.
/// While paused, a single-step request lets exactly one due frame through.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePacer {
    target_frame_rate: u32,
    ticks_per_frame: u32,
    last_update_ms: f64,
    paused: bool,
    single_step: bool,
}

pub const TARGET_FRAME_RATE: u32 = 60;
pub const TICKS_PER_FRAME: u32 = 1;

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(TARGET_FRAME_RATE, TICKS_PER_FRAME)
    }
}

impl FramePacer {
    /// Rates of zero are raised to one.
    pub fn new(target_frame_rate: u32, ticks_per_frame: u32) -> Self {
        Self {
            target_frame_rate: target_frame_rate.max(1),
            ticks_per_frame: ticks_per_frame.max(1),
            last_update_ms: f64::NEG_INFINITY,
            paused: false,
            single_step: false,
        }
    }

    /// Minimum whole milliseconds between updates.
    pub fn interval_ms(&self) -> u32 {
        1000 / self.target_frame_rate
    }

    pub fn ticks_per_frame(&self) -> u32 {
        self.ticks_per_frame
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Let the next due frame through even while paused.
    pub fn request_single_step(&mut self) {
        self.single_step = true;
    }

    /// `true` if the simulation should advance on the frame rendered at
    /// `now_ms`. A pending single-step request is consumed either way.
    pub fn should_update(&mut self, now_ms: f64) -> bool {
        let runnable = !self.paused || self.single_step;
        self.single_step = false;
        if !runnable {
            return false;
        }
        if now_ms - self.last_update_ms > f64::from(self.interval_ms()) {
            self.last_update_ms = now_ms;
            true
        } else {
            false
        }
    }
}
