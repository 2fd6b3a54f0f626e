//! Frame clock for driving rigs at a fixed step.
//!
//! Game engines hand the rig a per-frame delta. Offline tools (the CLI
//! simulator, tests) use this clock to produce the same deltas
//! deterministically.

/// A fixed-step frame clock anchored to a wall-clock epoch.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Seconds per frame.
    step_secs: f32,

    /// Frames produced so far.
    frame: u64,

    /// Wall-clock time at creation (ISO 8601 string).
    epoch_wall: String,
}

impl FrameClock {
    /// Create a clock producing `fps` frames per simulated second.
    ///
    /// A rate of zero is treated as one frame per second.
    pub fn new(fps: u32) -> Self {
        Self {
            step_secs: 1.0 / fps.max(1) as f32,
            frame: 0,
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Advance one frame and return its delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.frame += 1;
        self.step_secs
    }

    /// Frame delta in seconds.
    pub fn step_secs(&self) -> f32 {
        self.step_secs
    }

    /// Number of frames ticked.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds elapsed.
    ///
    /// Computed from the frame count so it does not accumulate float error.
    pub fn elapsed_secs(&self) -> f64 {
        self.frame as f64 * self.step_secs as f64
    }

    /// Number of frames needed to cover `secs` of simulated time.
    pub fn frames_for(&self, secs: f64) -> u64 {
        if secs <= 0.0 {
            return 0;
        }
        (secs / self.step_secs as f64).ceil() as u64
    }

    /// Wall-clock time at clock creation.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Sanitize an externally supplied frame delta.
///
/// Negative, NaN and infinite deltas collapse to zero.
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances() {
        let mut clock = FrameClock::new(50);
        assert_eq!(clock.frame(), 0);
        let dt = clock.tick();
        assert!((dt - 0.02).abs() < 1e-6);
        clock.tick();
        assert_eq!(clock.frame(), 2);
        assert!((clock.elapsed_secs() - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let clock = FrameClock::new(0);
        assert!((clock.step_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frames_for() {
        let clock = FrameClock::new(60);
        assert_eq!(clock.frames_for(1.0), 60);
        assert_eq!(clock.frames_for(0.0), 0);
        assert_eq!(clock.frames_for(-3.0), 0);
    }

    #[test]
    fn test_sanitize_dt() {
        assert_eq!(sanitize_dt(0.016), 0.016);
        assert_eq!(sanitize_dt(-1.0), 0.0);
        assert_eq!(sanitize_dt(f32::NAN), 0.0);
        assert_eq!(sanitize_dt(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_epoch_wall_is_rfc3339() {
        let clock = FrameClock::new(30);
        assert!(chrono::DateTime::parse_from_rfc3339(clock.epoch_wall()).is_ok());
    }
}
