use std::time::Instant;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub number: u64,
    /// Wall-clock seconds since the Unix epoch
    pub time: f64,
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f64, delta: f32) -> Self {
        Self {
            number,
            time,
            delta,
        }
    }
}

/// Wall-clock time in seconds since the Unix epoch, millisecond resolution
pub fn wall_clock_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 * 0.001
}

/// Hands out one `FrameInfo` per rendered frame
#[derive(Debug)]
pub struct FrameClock {
    frame_number: u64,
    last_frame_time: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            frame_number: 0,
            last_frame_time: Instant::now(),
        }
    }

    /// Advance to the next frame
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        let info = FrameInfo::new(self.frame_number, wall_clock_seconds(), delta);

        self.frame_number += 1;
        self.last_frame_time = now;

        info
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages frame deltas over one second windows
#[derive(Debug, Default)]
pub struct FpsCounter {
    frame_count: u32,
    timer: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame; returns the new average when a window closes
    pub fn record(&mut self, delta: f32) -> Option<f32> {
        self.frame_count += 1;
        self.timer += delta;

        if self.timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.timer;
            self.frame_count = 0;
            self.timer = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
