use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame, in seconds.
    pub dt: f32,
    /// Sum of all clamped deltas since the clock started, in seconds.
    pub elapsed: f32,
    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Produces per-frame deltas for the render loop.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// teleport the camera on the next frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: Duration::ZERO,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the wall-clock baseline, e.g. after the window is restored.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances by the wall-clock time since the previous tick.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.step(dt)
    }

    /// Advances by a fixed step instead of the wall clock.
    pub fn advance(&mut self, dt: Duration) -> FrameTime {
        self.last = Instant::now();
        self.step(dt)
    }

    fn step(&mut self, dt: Duration) -> FrameTime {
        let dt = dt.clamp(self.dt_min, self.dt_max);
        self.elapsed += dt;

        let frame = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
